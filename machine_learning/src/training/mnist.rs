use log::{debug, warn};

use super::{Learner, TrainStats};
use crate::{
    MlErr, Result,
    arch::{
        MnistNet, SAMPLE_SIZE,
        loss::{CrossEntropy, LossFn, accuracy},
        max_pool,
    },
    optimization::{GradientDescent, Optimizer},
    params,
};

/// Default SGD step length.
pub const DEFAULT_LEARNING_RATE: f32 = 3e-4;

/// `MnistNet` trained in place with an optimizer.
///
/// The parameters are decoded once from the blob, the blob itself is never touched.
pub struct MnistLearner<O: Optimizer = GradientDescent> {
    net: MnistNet,
    params: Vec<f32>,
    grad: Vec<f32>,
    loss_fn: CrossEntropy,
    optimizer: O,
}

impl MnistLearner<GradientDescent> {
    /// Creates a learner trained with plain gradient descent.
    ///
    /// # Arguments
    /// * `blob` - The initial parameters blob.
    /// * `learning_rate` - The SGD step length.
    pub fn sgd(blob: &[u8], learning_rate: f32) -> Result<Self> {
        Self::new(blob, GradientDescent::new(learning_rate))
    }
}

impl<O: Optimizer> MnistLearner<O> {
    /// Creates a new `MnistLearner`.
    ///
    /// # Arguments
    /// * `blob` - The initial parameters blob.
    /// * `optimizer` - The update rule applied after every training step.
    ///
    /// # Returns
    /// The learner or an error if the blob doesn't fit the network.
    pub fn new(blob: &[u8], optimizer: O) -> Result<Self> {
        let params = params::from_blob(blob)?;
        debug!(params = params.len(); "decoded model parameters");

        Ok(Self {
            net: MnistNet::new(),
            grad: vec![0.0; params.len()],
            params,
            loss_fn: CrossEntropy::new(),
            optimizer,
        })
    }

    /// The current parameters.
    pub fn params(&self) -> &[f32] {
        &self.params
    }
}

impl<O: Optimizer> Learner for MnistLearner<O> {
    fn train(&mut self, samples: &[u8], labels: &[u8]) -> Result<TrainStats> {
        let Self {
            net,
            params,
            grad,
            loss_fn,
            optimizer,
        } = self;

        let x = input(samples, labels)?;

        let y_pred = net.forward(params, x.view())?;
        let loss = loss_fn.loss(y_pred.view(), labels)?;
        if !loss.is_finite() {
            warn!("training loss is {loss}");
        }

        let d = loss_fn.loss_prime(y_pred.view(), labels)?;
        net.backward(params, grad, d)?;
        optimizer.update_params(params, grad);

        let y_pred = net.forward(params, x.view())?;
        let accuracy = accuracy(y_pred.view(), labels)?;

        Ok(TrainStats::new(loss, accuracy))
    }

    fn evaluate(&mut self, samples: &[u8], labels: &[u8]) -> Result<f32> {
        let x = input(samples, labels)?;
        let y_pred = self.net.forward(&self.params, x.view())?;
        accuracy(y_pred.view(), labels)
    }
}

fn input(samples: &[u8], labels: &[u8]) -> Result<ndarray::Array2<f32>> {
    if samples.len() != labels.len() * SAMPLE_SIZE {
        return Err(MlErr::SizeMismatch {
            what: "samples and labels",
            got: samples.len(),
            expected: labels.len() * SAMPLE_SIZE,
        });
    }

    max_pool(samples)
}
