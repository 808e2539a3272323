mod learner;
mod mnist;

pub use learner::{Learner, TrainStats};
pub use mnist::{DEFAULT_LEARNING_RATE, MnistLearner};
