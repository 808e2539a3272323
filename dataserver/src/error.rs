use std::{error::Error, fmt, io, path::PathBuf};

/// The dataserver module's result type.
pub type Result<T> = std::result::Result<T, DataErr>;

/// Failures while loading the corpus or configuring the server.
#[derive(Debug)]
pub enum DataErr {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    BadMagic {
        expected: u32,
        got: u32,
    },
    BadDims {
        rows: u32,
        cols: u32,
    },
    Truncated {
        expected: usize,
        got: usize,
    },
    CountMismatch {
        samples: usize,
        labels: usize,
    },
    InvalidConfig(String),
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            DataErr::BadMagic { expected, got } => {
                write!(f, "bad idx magic number {got:#010x}, expected {expected:#010x}")
            }
            DataErr::BadDims { rows, cols } => {
                write!(f, "images are {rows}x{cols}, expected 28x28")
            }
            DataErr::Truncated { expected, got } => {
                write!(f, "idx file truncated: expected {expected} bytes, got {got}")
            }
            DataErr::CountMismatch { samples, labels } => {
                write!(f, "{samples} samples but {labels} labels")
            }
            DataErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
