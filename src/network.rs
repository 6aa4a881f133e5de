use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::activations::Activation;
use crate::agent::QFunction;
use crate::error::{DqnError, Result};
use crate::layers::{DenseLayer, WeightInit};
use crate::optimizer::{Optimizer, OptimizerKind, OptimizerWrapper};

/// Feed-forward action-value network: `D -> hidden (ReLU) -> A (linear)`.
///
/// The network owns its parameters and its optimizer state. Nothing else
/// can reach them except through [`QFunction::predict`] and
/// [`QFunction::update`].
///
/// ```
/// use cartpole_dqn::agent::QFunction;
/// use cartpole_dqn::network::QNetwork;
/// use cartpole_dqn::optimizer::OptimizerKind;
/// use ndarray::array;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let network = QNetwork::new(4, 100, 2, 0.001, OptimizerKind::Adam, &mut rng).unwrap();
/// let values = network.predict(array![[0.1, 0.2, 0.3, 0.4]].view()).unwrap();
/// assert_eq!(values.dim(), (1, 2));
/// ```
pub struct QNetwork {
    pub layers: Vec<DenseLayer>,
    optimizer: OptimizerWrapper,
    learning_rate: f32,
}

impl QNetwork {
    /// Build a freshly initialized network with one hidden layer.
    pub fn new<R: Rng + ?Sized>(
        state_dim: usize,
        hidden_units: usize,
        num_actions: usize,
        learning_rate: f32,
        optimizer: OptimizerKind,
        rng: &mut R,
    ) -> Result<Self> {
        for (name, size) in [
            ("state_dim", state_dim),
            ("hidden_units", hidden_units),
            ("num_actions", num_actions),
        ] {
            if size == 0 {
                return Err(DqnError::invalid_parameter(name, "must be greater than 0"));
            }
        }

        let init = WeightInit::default();
        let layers = vec![
            DenseLayer::new(state_dim, hidden_units, Activation::Relu, &init, rng),
            DenseLayer::new(hidden_units, num_actions, Activation::Linear, &init, rng),
        ];

        Self::with_layers(layers, optimizer, learning_rate)
    }

    /// Build a network from explicit layers. Consecutive layers must chain.
    pub fn with_layers(layers: Vec<DenseLayer>, optimizer: OptimizerKind, learning_rate: f32) -> Result<Self> {
        if layers.is_empty() {
            return Err(DqnError::invalid_parameter("layers", "network needs at least one layer"));
        }
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(DqnError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be positive and finite, got {}", learning_rate),
            ));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DqnError::dimension_mismatch(
                    format!("layer input of {}", pair[0].output_size()),
                    format!("{}", pair[1].input_size()),
                ));
            }
        }

        let optimizer = optimizer.build(&layers);
        let network = QNetwork {
            layers,
            optimizer,
            learning_rate,
        };
        debug!(
            "initialized q-network {} -> {} with {} parameters",
            network.state_dim(),
            network.num_actions(),
            network.parameter_count()
        );
        Ok(network)
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// A batch with no rows passes whatever its column count.
    fn check_states(&self, states: ArrayView2<f32>) -> Result<()> {
        if states.nrows() > 0 && states.ncols() != self.state_dim() {
            return Err(DqnError::dimension_mismatch(
                format!("states with {} columns", self.state_dim()),
                format!("{} columns", states.ncols()),
            ));
        }
        Ok(())
    }

    fn check_batch(&self, states: ArrayView2<f32>, actions: &[usize], targets: ArrayView1<f32>) -> Result<()> {
        self.check_states(states)?;
        let n = states.nrows();
        if actions.len() != n || targets.len() != n {
            return Err(DqnError::dimension_mismatch(
                format!("{} actions and targets", n),
                format!("{} actions, {} targets", actions.len(), targets.len()),
            ));
        }
        if let Some(&action) = actions.iter().find(|&&a| a >= self.num_actions()) {
            return Err(DqnError::InvalidAction {
                action,
                max_actions: self.num_actions(),
            });
        }
        Ok(())
    }

    /// Mean squared error of the selected action values against `targets`.
    pub fn loss(&self, states: ArrayView2<f32>, actions: &[usize], targets: ArrayView1<f32>) -> Result<f32> {
        self.check_batch(states, actions, targets)?;
        if actions.is_empty() {
            return Ok(0.0);
        }
        let q_values = self.forward_batch(states);
        let sum: f32 = actions
            .iter()
            .zip(targets.iter())
            .enumerate()
            .map(|(i, (&a, &t))| (q_values[[i, a]] - t).powi(2))
            .sum();
        Ok(sum / actions.len() as f32)
    }
}

impl QFunction for QNetwork {
    fn state_dim(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_states(states)?;
        if states.nrows() == 0 {
            return Ok(Array2::zeros((0, self.num_actions())));
        }
        Ok(self.forward_batch(states))
    }

    fn update(
        &mut self,
        states: ArrayView2<f32>,
        actions: &[usize],
        targets: ArrayView1<f32>,
    ) -> Result<Option<f32>> {
        self.check_batch(states, actions, targets)?;
        let batch_size = states.nrows();
        if batch_size == 0 {
            return Ok(None);
        }

        let mut traces = Vec::with_capacity(self.layers.len());
        let mut current_output = states.to_owned();
        for layer in &self.layers {
            let (output, trace) = layer.forward_traced(current_output.view());
            traces.push(trace);
            current_output = output;
        }

        // Only the selected action's output carries error.
        let scale = 2.0 / batch_size as f32;
        let mut output_errors = Array2::<f32>::zeros(current_output.dim());
        let mut loss = 0.0;
        for (i, (&action, &target)) in actions.iter().zip(targets.iter()).enumerate() {
            let diff = current_output[[i, action]] - target;
            loss += diff * diff;
            output_errors[[i, action]] = scale * diff;
        }
        let loss = loss / batch_size as f32;
        if !loss.is_finite() {
            return Err(DqnError::NumericalError(format!("non-finite loss {}", loss)));
        }

        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors;
        for (index, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) =
                layer.backward_batch(&traces[index], current_error.view());
            if index != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
            gradients.push((weight_gradients, bias_gradients));
        }
        gradients.reverse();

        self.optimizer.begin_step();
        for (index, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer
                .update_weights(index, &mut layer.weights, &weight_gradients, self.learning_rate);
            self.optimizer
                .update_biases(index, &mut layer.biases, &bias_gradients, self.learning_rate);
        }

        Ok(Some(loss))
    }
}

impl Drop for QNetwork {
    fn drop(&mut self) {
        debug!("releasing q-network with {} parameters", self.parameter_count());
    }
}
