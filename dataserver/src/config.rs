use std::{env, path::PathBuf, time::Duration};

use crate::{DataErr, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 29999;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mnist_dir: PathBuf,
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, `MNIST_DIR` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mnist_dir = lookup("MNIST_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| DataErr::InvalidConfig("MNIST_DIR is not set".to_string()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| DataErr::InvalidConfig(format!("PORT={raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };

        let idle_timeout = match lookup("IDLE_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|e| DataErr::InvalidConfig(format!("IDLE_TIMEOUT_MS={raw:?}: {e}")))?,
            None => DEFAULT_IDLE_TIMEOUT,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            mnist_dir,
            idle_timeout,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
