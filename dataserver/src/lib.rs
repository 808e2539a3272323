//! Serves MNIST batches to devices over the batch protocol.

pub mod config;
mod corpus;
mod error;
pub mod idx;
pub mod server;

pub use config::ServerConfig;
pub use corpus::{Corpus, Mnist};
pub use error::{DataErr, Result};
pub use server::{Closed, serve, serve_connection};
