pub mod arch;
pub mod error;
pub mod optimization;
pub mod params;
pub mod training;

pub use error::{MlErr, Result};
pub use training::{Learner, MnistLearner, TrainStats};
