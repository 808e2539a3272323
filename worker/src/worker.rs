use std::fmt;

use comms::{Batch, BatchRequest};
use log::{debug, info};
use machine_learning::Learner;
use rand::Rng;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::Instant,
};

use crate::{BatchClient, Result, WorkerConfig, WorkerErr, WorkerMetrics};

/// Steps between progress summaries.
const REPORT_EVERY: usize = 100;

/// The stages of a run, strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Connecting,
    Training,
    Evaluating,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connecting => "connecting",
            Phase::Training => "training",
            Phase::Evaluating => "evaluating",
            Phase::Done => "done",
        };

        f.write_str(name)
    }
}

/// Drives a fixed amount of training steps followed by a fixed amount of evaluation steps,
/// fetching one batch per step.
pub struct Worker<L: Learner, G: Rng> {
    batch_size: usize,
    train_steps: usize,
    eval_steps: usize,
    corpus_size: usize,
    learner: L,
    rng: G,
    batch: Batch,
    phase: Phase,
    metrics: WorkerMetrics,
}

impl<L: Learner, G: Rng> Worker<L, G> {
    /// Creates a new `Worker`.
    ///
    /// # Arguments
    /// * `cfg` - The run bounds.
    /// * `learner` - The learning routines, shared by both phases.
    /// * `rng` - Draws the training sample indices.
    ///
    /// # Returns
    /// The worker or an error if `cfg` is inconsistent.
    pub fn new(cfg: &WorkerConfig, learner: L, rng: G) -> Result<Self> {
        cfg.validate()?;

        let batch_size = cfg.batch_size.get();

        Ok(Self {
            batch_size,
            train_steps: cfg.train_steps,
            eval_steps: cfg.eval_steps,
            corpus_size: cfg.corpus_size,
            learner,
            rng,
            batch: Batch::new(batch_size),
            phase: Phase::Connecting,
            metrics: WorkerMetrics::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    pub(crate) fn enter(&mut self, next: Phase) {
        debug_assert!(next >= self.phase, "{} can't follow {}", next, self.phase);

        if next != self.phase {
            info!("{} -> {}", self.phase, next);
            self.phase = next;
        }
    }

    /// Runs the training and evaluation phases over `client`.
    ///
    /// # Arguments
    /// * `client` - The data server connection.
    ///
    /// # Returns
    /// The run's metrics, or the first fetch or learning failure.
    pub async fn run<R, W>(&mut self, client: &mut BatchClient<R, W>) -> Result<WorkerMetrics>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.enter(Phase::Training);
        self.train(client).await?;

        self.enter(Phase::Evaluating);
        self.evaluate(client).await?;

        self.enter(Phase::Done);
        let metrics = &self.metrics;
        info!(
            train_steps = metrics.train_steps,
            eval_steps = metrics.eval_steps,
            fetch_ms = metrics.fetch_time.as_millis() as u64,
            compute_ms = metrics.compute_time.as_millis() as u64;
            "average accuracy: {}",
            metrics.eval_accuracy.mean()
        );

        Ok(self.metrics.clone())
    }

    async fn train<R, W>(&mut self, client: &mut BatchClient<R, W>) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let batch_size = self.batch_size as i32;
        let upper = (self.corpus_size - self.batch_size) as i32;

        for step in 0..self.train_steps {
            let index = self.rng.random_range(0..upper);
            let req = BatchRequest::new(index, batch_size);
            self.fetch(client, &req, step).await?;

            let start = Instant::now();
            let stats = self
                .learner
                .train(self.batch.samples(), self.batch.labels())
                .map_err(|source| WorkerErr::Learn {
                    phase: Phase::Training,
                    step,
                    source,
                })?;
            self.metrics.add_compute_time(start.elapsed());

            self.metrics.train_steps += 1;
            self.metrics.last_loss = Some(stats.loss());
            self.metrics.last_train_accuracy = Some(stats.accuracy());

            debug!(step = step, index = index; "loss: {}, accuracy: {}", stats.loss(), stats.accuracy());
            if (step + 1) % REPORT_EVERY == 0 {
                info!(
                    "train step {}/{}: loss {}, accuracy {}",
                    step + 1,
                    self.train_steps,
                    stats.loss(),
                    stats.accuracy()
                );
            }
        }

        Ok(())
    }

    async fn evaluate<R, W>(&mut self, client: &mut BatchClient<R, W>) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        for step in 0..self.eval_steps {
            let req = BatchRequest::single(step as i32);
            self.fetch(client, &req, step).await?;

            let start = Instant::now();
            let accuracy = self
                .learner
                .evaluate(self.batch.samples(), self.batch.labels())
                .map_err(|source| WorkerErr::Learn {
                    phase: Phase::Evaluating,
                    step,
                    source,
                })?;
            self.metrics.add_compute_time(start.elapsed());

            self.metrics.eval_steps += 1;
            let mean = self.metrics.eval_accuracy.push(accuracy);

            debug!(step = step; "accuracy: {accuracy}, running average: {mean}");
            if (step + 1) % REPORT_EVERY == 0 {
                info!("eval step {}/{}: running average accuracy {mean}", step + 1, self.eval_steps);
            }
        }

        Ok(())
    }

    async fn fetch<R, W>(&mut self, client: &mut BatchClient<R, W>, req: &BatchRequest, step: usize) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let start = Instant::now();

        client
            .fetch(req, &mut self.batch)
            .await
            .map_err(|source| WorkerErr::Fetch {
                phase: self.phase,
                step,
                source,
            })?;

        self.metrics.add_fetch_time(start.elapsed());
        Ok(())
    }
}
