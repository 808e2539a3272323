use ndarray::{Array2, ArrayView2};

use super::{POOLED_SIZE, activations::ActFn, layers::Dense};
use crate::{MlErr, Result};

/// Digit classifier: pooled pixels, a hidden ReLU layer and ten output logits.
#[derive(Clone)]
pub struct MnistNet {
    hidden: Dense,
    output: Dense,
}

impl MnistNet {
    pub const INPUTS: usize = POOLED_SIZE;
    pub const HIDDEN: usize = 64;
    pub const CLASSES: usize = 10;

    /// The amount of parameters of the whole network.
    pub const SIZE: usize = Self::INPUTS * Self::HIDDEN + Self::HIDDEN * Self::CLASSES;

    pub fn new() -> Self {
        Self {
            hidden: Dense::new((Self::INPUTS, Self::HIDDEN), Some(ActFn::relu())),
            output: Dense::new((Self::HIDDEN, Self::CLASSES), None),
        }
    }

    /// Fan-in and size of every layer, in parameter order.
    pub fn layout() -> [(usize, usize); 2] {
        [
            (Self::INPUTS, Self::INPUTS * Self::HIDDEN),
            (Self::HIDDEN, Self::HIDDEN * Self::CLASSES),
        ]
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The network's `SIZE` parameters.
    /// * `x` - A `(batch, INPUTS)` matrix of pooled images.
    ///
    /// # Returns
    /// The `(batch, CLASSES)` logits or an error if occurred.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (hidden, output) = self.split(params)?;

        let a = self.hidden.forward(hidden, x)?;
        self.output.forward(output, a.view())
    }

    /// Backpropagates the loss derivative `d` of the last forward pass into `grad`.
    ///
    /// # Arguments
    /// * `params` - The parameters used in the last forward pass.
    /// * `grad` - A `SIZE` long gradient buffer, overwritten.
    /// * `d` - The loss derivative with respect to the logits.
    pub fn backward(&mut self, params: &[f32], grad: &mut [f32], d: Array2<f32>) -> Result<()> {
        let (hidden, output) = self.split(params)?;

        if grad.len() != Self::SIZE {
            return Err(MlErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: Self::SIZE,
            });
        }

        let (hidden_grad, output_grad) = grad.split_at_mut(self.hidden.size());
        let d = self.output.backward(output, output_grad, d)?;
        self.hidden.backward(hidden, hidden_grad, d)?;

        Ok(())
    }

    fn split<'a>(&self, params: &'a [f32]) -> Result<(&'a [f32], &'a [f32])> {
        if params.len() != Self::SIZE {
            return Err(MlErr::SizeMismatch {
                what: "parameters",
                got: params.len(),
                expected: Self::SIZE,
            });
        }

        Ok(params.split_at(self.hidden.size()))
    }
}

impl Default for MnistNet {
    fn default() -> Self {
        Self::new()
    }
}
