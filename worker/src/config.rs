use std::{env, fmt::Display, num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use comms::MAX_BATCH_SIZE;
use machine_learning::training::DEFAULT_LEARNING_RATE;

use crate::{Result, WorkerErr};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 29999;
pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_TRAIN_STEPS: usize = 1000;
pub const DEFAULT_EVAL_STEPS: usize = 10000;
pub const DEFAULT_CORPUS_SIZE: usize = 60000;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Immutable execution bounds for a device run.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub host: String,
    pub port: u16,
    pub batch_size: NonZeroUsize,
    pub train_steps: usize,
    pub eval_steps: usize,
    pub corpus_size: usize,
    pub retry_interval: Duration,
    pub recv_timeout: Option<Duration>,
    pub seed: Option<u64>,
    pub params_path: Option<PathBuf>,
    pub learning_rate: f32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            train_steps: DEFAULT_TRAIN_STEPS,
            eval_steps: DEFAULT_EVAL_STEPS,
            corpus_size: DEFAULT_CORPUS_SIZE,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            recv_timeout: None,
            seed: None,
            params_path: None,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl WorkerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Returns
    /// The defaults overridden by every variable that is set, or an error if any of them is
    /// malformed or the result is inconsistent.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Arguments
    /// * `lookup` - Returns the raw value of a variable, if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("SERVER_HOST") {
            cfg.host = host;
        }
        if let Some(port) = parse(&lookup, "SERVER_PORT")? {
            cfg.port = port;
        }
        if let Some(batch_size) = parse(&lookup, "BATCH_SIZE")? {
            cfg.batch_size = batch_size;
        }
        if let Some(steps) = parse(&lookup, "TRAIN_STEPS")? {
            cfg.train_steps = steps;
        }
        if let Some(steps) = parse(&lookup, "EVAL_STEPS")? {
            cfg.eval_steps = steps;
        }
        if let Some(size) = parse(&lookup, "CORPUS_SIZE")? {
            cfg.corpus_size = size;
        }
        if let Some(ms) = parse(&lookup, "RETRY_MS")? {
            cfg.retry_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse(&lookup, "RECV_TIMEOUT_MS")? {
            cfg.recv_timeout = Some(Duration::from_millis(ms));
        }
        cfg.seed = parse(&lookup, "SEED")?;
        cfg.params_path = lookup("PARAMS_PATH").map(PathBuf::from);
        if let Some(lr) = parse(&lookup, "LEARNING_RATE")? {
            cfg.learning_rate = lr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the invariants the run relies on.
    pub fn validate(&self) -> Result<()> {
        let bs = self.batch_size.get();

        if bs > MAX_BATCH_SIZE {
            return invalid(format!(
                "batch size {bs} doesn't fit a single response frame, the maximum is {MAX_BATCH_SIZE}"
            ));
        }
        if self.corpus_size <= bs {
            return invalid(format!(
                "corpus size {} must be larger than the batch size {bs}",
                self.corpus_size
            ));
        }
        if self.corpus_size > i32::MAX as usize || self.eval_steps > i32::MAX as usize {
            return invalid("sample indices must fit in an i32".to_string());
        }
        if self.retry_interval.is_zero() {
            return invalid("retry interval must be longer than zero".to_string());
        }
        if self.recv_timeout.is_some_and(|t| t.is_zero()) {
            return invalid("receive timeout must be longer than zero".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning rate {} must be positive", self.learning_rate));
        }

        Ok(())
    }

    /// The data server endpoint as `host:port`.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| WorkerErr::InvalidConfig(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(WorkerErr::InvalidConfig(msg))
}
