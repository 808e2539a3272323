use std::{error::Error, fmt, io, time::Duration};

/// The comms module's result type.
pub type Result<T> = std::result::Result<T, CommsErr>;

/// Failures while exchanging batches.
#[derive(Debug)]
pub enum CommsErr {
    Io(io::Error),
    InvalidBatchSize(i32),
    FrameTooLarge {
        batch_size: usize,
        len: usize,
        capacity: usize,
    },
    BatchOverflow {
        batch_size: usize,
        capacity: usize,
    },
    ShortResponse {
        expected: usize,
        got: usize,
    },
    Timeout {
        expected: usize,
        got: usize,
        after: Duration,
    },
}

impl fmt::Display for CommsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommsErr::Io(e) => write!(f, "io error: {e}"),
            CommsErr::InvalidBatchSize(bs) => write!(f, "invalid batch size {bs}"),
            CommsErr::FrameTooLarge {
                batch_size,
                len,
                capacity,
            } => write!(
                f,
                "a batch of {batch_size} samples needs a {len} bytes frame, the receive capacity is {capacity}"
            ),
            CommsErr::BatchOverflow {
                batch_size,
                capacity,
            } => write!(
                f,
                "a batch of {batch_size} samples does not fit a buffer of {capacity} samples"
            ),
            CommsErr::ShortResponse { expected, got } => write!(
                f,
                "connection closed mid response: got {got} of {expected} bytes"
            ),
            CommsErr::Timeout {
                expected,
                got,
                after,
            } => write!(
                f,
                "response timed out after {after:?}: got {got} of {expected} bytes"
            ),
        }
    }
}

impl Error for CommsErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CommsErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CommsErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<CommsErr> for io::Error {
    fn from(value: CommsErr) -> Self {
        match value {
            CommsErr::Io(e) => e,
            e @ CommsErr::Timeout { .. } => io::Error::new(io::ErrorKind::TimedOut, e),
            e @ CommsErr::ShortResponse { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
