use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer without biases.
///
/// The weights are a row-major `(inputs, outputs)` matrix read from a flat parameter slice.
#[derive(Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs.
    /// * `act_fn` - An optional activation applied to the outputs.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((1, 1));

        Self {
            dim,
            act_fn,
            x: zeros.clone(),
            z: zeros,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.dim.0 * self.dim.1
    }

    /// Computes the layer's output for a `(batch, inputs)` matrix, keeping what `backward` needs.
    ///
    /// # Arguments
    /// * `params` - Exactly `size` weights.
    /// * `x` - The input rows.
    ///
    /// # Returns
    /// The activated `(batch, outputs)` matrix.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let w = self.view_params(params)?;

        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense layer inputs",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        self.x = x.to_owned();
        self.z = x.dot(&w);

        let a = match &self.act_fn {
            Some(act_fn) => self.z.mapv(|z| act_fn.f(z)),
            None => self.z.clone(),
        };

        Ok(a)
    }

    /// Backpropagates `d` through this layer, writing the weights gradient into `grad`.
    ///
    /// # Arguments
    /// * `params` - The same weights given to the last `forward`.
    /// * `grad` - Exactly `size` gradient slots, overwritten.
    /// * `d` - The loss derivative with respect to this layer's output.
    ///
    /// # Returns
    /// The loss derivative with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let mut dw = ArrayViewMut2::from_shape(self.dim, grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);

        let w = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw parameter slice as the weights of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<ArrayView2<'a, f32>> {
        Ok(ArrayView2::from_shape(self.dim, params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn forward_multiplies_rows() {
        let mut dense = Dense::new((2, 3), None);
        let params = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = array![[1.0, 1.0], [0.0, 2.0]];

        let y = dense.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[5.0, 7.0, 9.0], [8.0, 10.0, 12.0]]);
    }

    #[test]
    fn relu_masks_gradient() {
        let mut dense = Dense::new((1, 2), Some(ActFn::relu()));
        let params = [1.0, -1.0];
        let x = array![[2.0]];

        let y = dense.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[2.0, 0.0]]);

        let mut grad = [0.0; 2];
        let dx = dense
            .backward(&params, &mut grad, array![[1.0, 1.0]])
            .unwrap();

        assert_eq!(grad, [2.0, 0.0]);
        assert_eq!(dx, array![[1.0]]);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let mut dense = Dense::new((3, 1), None);
        let x = array![[1.0, 2.0]];
        assert!(dense.forward(&[0.0; 3], x.view()).is_err());
    }
}
