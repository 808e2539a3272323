use ndarray::{Array2, ArrayView2};

use crate::Result;

/// A loss over raw model outputs and class labels.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<f32>;
    fn loss_prime(&self, y_pred: ArrayView2<f32>, labels: &[u8]) -> Result<Array2<f32>>;
}
