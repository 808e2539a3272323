pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics;
pub mod net;
pub mod reachability;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{Result, WorkerErr};
pub use metrics::{RunningMean, WorkerMetrics};
pub use net::BatchClient;
pub use reachability::{Connectivity, LinkEvent, NetworkLink, Reachability};
pub use worker::{Phase, Worker};
