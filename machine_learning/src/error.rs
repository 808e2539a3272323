use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    BlobLength {
        got: usize,
        expected: usize,
    },
    LabelOutOfRange {
        label: u8,
        classes: usize,
    },
    Shape(ShapeError),
    Init(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in the {what}, got {got} and expected {expected}"
            ),
            MlErr::BlobLength { got, expected } => write!(
                f,
                "The parameters blob has {got} bytes, the model needs exactly {expected}"
            ),
            MlErr::LabelOutOfRange { label, classes } => {
                write!(f, "Got label {label} but the model only has {classes} classes")
            }
            MlErr::Shape(e) => write!(f, "Invalid array shape: {e}"),
            MlErr::Init(e) => write!(f, "Failed to initialize the parameters: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for MlErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}
