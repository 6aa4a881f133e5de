//! Epsilon-greedy action selection and the exploration-rate schedule.

use ndarray::ArrayView1;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// Index of the largest value; the first index wins on ties.
///
/// NaN never beats a comparable value. Returns `None` for an empty slice.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            None => best = Some((index, value)),
            Some((_, current)) if value > current || (current.is_nan() && !value.is_nan()) => {
                best = Some((index, value));
            }
            _ => {}
        }
    }
    best.map(|(index, _)| index)
}

/// Pick an action from estimated `values`.
///
/// A uniformly random action and the greedy action are both computed on
/// every call; a fresh uniform draw below `epsilon` selects the random one.
pub fn epsilon_greedy<R: Rng + ?Sized>(values: ArrayView1<f32>, epsilon: f32, rng: &mut R) -> Result<usize> {
    let greedy_action = argmax(values)
        .ok_or_else(|| DqnError::NumericalError("no action values to choose from".to_string()))?;
    let random_action = rng.gen_range(0..values.len());
    if rng.gen::<f32>() < epsilon {
        Ok(random_action)
    } else {
        Ok(greedy_action)
    }
}

/// How epsilon changes when an episode ends.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonDecay {
    /// `eps = max(1.0, 0.1 * eps)`.
    ///
    /// The reference recurrence. Starting from 1.0 it never moves, so the
    /// agent keeps acting uniformly at random.
    Clamped,

    /// `eps = max(floor, factor * eps)`.
    Geometric { factor: f32, floor: f32 },
}

impl Default for EpsilonDecay {
    fn default() -> Self {
        EpsilonDecay::Clamped
    }
}

impl EpsilonDecay {
    pub fn next(&self, epsilon: f32) -> f32 {
        match *self {
            EpsilonDecay::Clamped => (0.1 * epsilon).max(1.0),
            EpsilonDecay::Geometric { factor, floor } => (factor * epsilon).max(floor),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let EpsilonDecay::Geometric { factor, floor } = *self {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(DqnError::invalid_parameter(
                    "epsilon_decay.factor".to_string(),
                    format!("must be in (0, 1], got {}", factor),
                ));
            }
            if !(0.0..=1.0).contains(&floor) {
                return Err(DqnError::invalid_parameter(
                    "epsilon_decay.floor".to_string(),
                    format!("must be in [0, 1], got {}", floor),
                ));
            }
        }
        Ok(())
    }
}
