mod client;
pub mod connector;
mod host_link;

pub use client::BatchClient;
pub use connector::{DialErr, Dialer, TcpDialer, connect};
pub use host_link::HostLink;
