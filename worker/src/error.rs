use std::{error::Error, fmt, io};

use comms::CommsErr;
use machine_learning::MlErr;

use crate::worker::Phase;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures, every one of them ends the run.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    Socket(io::Error),
    InvalidConfig(String),
    Params(MlErr),
    Fetch {
        phase: Phase,
        step: usize,
        source: CommsErr,
    },
    Learn {
        phase: Phase,
        step: usize,
        source: MlErr,
    },
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::Socket(e) => write!(f, "failed to create socket: {e}"),
            WorkerErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            WorkerErr::Params(e) => write!(f, "invalid model parameters: {e}"),
            WorkerErr::Fetch {
                phase,
                step,
                source,
            } => write!(f, "batch fetch failed at {phase} step {step}: {source}"),
            WorkerErr::Learn {
                phase,
                step,
                source,
            } => write!(f, "learning routine failed at {phase} step {step}: {source}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) | WorkerErr::Socket(e) => Some(e),
            WorkerErr::Params(e) => Some(e),
            WorkerErr::Fetch { source, .. } => Some(source),
            WorkerErr::Learn { source, .. } => Some(source),
            WorkerErr::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<MlErr> for WorkerErr {
    fn from(value: MlErr) -> Self {
        Self::Params(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Io(e) | WorkerErr::Socket(e) => e,
            WorkerErr::Fetch { source, .. } => source.into(),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
