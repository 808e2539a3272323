mod cross_entropy;
mod loss_fn;

pub use cross_entropy::{CrossEntropy, accuracy};
pub use loss_fn::LossFn;
