use crate::Result;

/// Metrics of a single training step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainStats {
    loss: f32,
    accuracy: f32,
}

impl TrainStats {
    /// Creates a new `TrainStats`.
    ///
    /// # Args
    /// * `loss` - The loss over the step's batch.
    /// * `accuracy` - The fraction of the batch classified correctly.
    pub fn new(loss: f32, accuracy: f32) -> Self {
        Self { loss, accuracy }
    }

    pub fn loss(&self) -> f32 {
        self.loss
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }
}

/// A locally resident learning routine fed one batch at a time.
///
/// `samples` holds `labels.len()` images of `28 x 28` intensities, sample-major and row-major.
pub trait Learner {
    /// Updates the model with one batch.
    ///
    /// # Returns
    /// The step's loss and accuracy.
    fn train(&mut self, samples: &[u8], labels: &[u8]) -> Result<TrainStats>;

    /// Scores the model on one batch without updating it.
    ///
    /// # Returns
    /// The fraction of the batch classified correctly.
    fn evaluate(&mut self, samples: &[u8], labels: &[u8]) -> Result<f32>;
}
