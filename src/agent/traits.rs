use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DqnError, Result};

/// An action-value function approximator.
///
/// This is the only surface the agent sees of its model: batched
/// prediction and a single regression step toward supplied targets.
pub trait QFunction {
    /// Dimensionality `D` of the state vectors it accepts.
    fn state_dim(&self) -> usize;

    /// Number `A` of discrete actions it scores.
    fn num_actions(&self) -> usize;

    /// Estimated action values, one row of `A` values per input row.
    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// One optimization step pulling `Q(states[i])[actions[i]]` toward
    /// `targets[i]` under mean squared error.
    ///
    /// Returns the loss measured before the step, or `None` when the batch
    /// is empty and nothing was updated.
    fn update(
        &mut self,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
    ) -> Result<Option<f32>>;

    /// Action values for a single state.
    fn predict_one(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let values = self.predict(state.insert_axis(Axis(0)))?;
        if values.nrows() != 1 {
            return Err(DqnError::dimension_mismatch(
                "1 row of action values".to_string(),
                format!("{} rows", values.nrows()),
            ));
        }
        Ok(values.index_axis_move(Axis(0), 0))
    }
}
