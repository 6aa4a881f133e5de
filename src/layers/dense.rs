use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use super::initialization::WeightInit;

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`.
///
/// Weights are stored `(input_size, output_size)` so a batch of row vectors
/// multiplies from the left.
#[derive(Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Intermediate values of a forward pass that backpropagation needs.
#[derive(Clone, Debug)]
pub struct ForwardTrace {
    pub inputs: Array2<f32>,
    pub pre_activation: Array2<f32>,
}

impl DenseLayer {
    /// Create a new dense layer drawing its initial weights from `rng`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: &WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights_using((input_size, output_size), rng),
            biases: init.initialize_biases(output_size),
            activation,
        }
    }

    /// Replace the weights. The shape must match the layer's.
    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("weights of shape {:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.len() != self.biases.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} biases", self.biases.len()),
                format!("{}", biases.len()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass for a batch of row vectors. Does not touch the layer.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what `backward_batch` needs.
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, ForwardTrace) {
        let pre_activation = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let trace = ForwardTrace {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, trace)
    }

    /// Gradients for a batch given dLoss/dOutput.
    ///
    /// Returns `(adjusted_error, weight_gradients, bias_gradients)` where
    /// `adjusted_error` is dLoss/dPreActivation, used to carry the error to
    /// the previous layer.
    pub fn backward_batch(
        &self,
        trace: &ForwardTrace,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let activation_deriv = self.activation.derivative_batch(trace.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = trace.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        (adjusted_error, weight_gradients, bias_gradients)
    }
}
