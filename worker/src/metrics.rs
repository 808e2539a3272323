use std::time::Duration;

/// Incremental mean of a stream of values.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningMean {
    sum: f32,
    n: usize,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates `x` into the mean.
    ///
    /// # Returns
    /// The mean of every value pushed so far, `x` included.
    pub fn push(&mut self, x: f32) -> f32 {
        self.sum += x;
        self.n += 1;
        self.mean()
    }

    /// The current mean, 0 while empty.
    pub fn mean(&self) -> f32 {
        if self.n == 0 {
            return 0.0;
        }

        self.sum / self.n as f32
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.n
    }
}

#[derive(Debug, Default, Clone)]
pub struct WorkerMetrics {
    pub fetch_time: Duration,
    pub compute_time: Duration,

    pub train_steps: usize,
    pub eval_steps: usize,

    pub last_loss: Option<f32>,
    pub last_train_accuracy: Option<f32>,
    pub eval_accuracy: RunningMean,
}

impl WorkerMetrics {
    #[inline]
    pub fn add_fetch_time(&mut self, dt: Duration) {
        self.fetch_time += dt;
    }

    #[inline]
    pub fn add_compute_time(&mut self, dt: Duration) {
        self.compute_time += dt;
    }
}
