pub mod activations;
pub mod layers;
pub mod loss;
mod net;
mod pool;

pub use net::MnistNet;
pub use pool::{IMAGE_SIDE, POOLED_SIZE, SAMPLE_SIZE, max_pool};
