use std::{error::Error, fmt, future::Future, io, net::SocketAddr, time::Duration};

use log::{error, info, warn};
use tokio::{
    net::{TcpSocket, TcpStream, lookup_host},
    time,
};

use crate::{Result, WorkerErr};

/// A failed connection attempt.
#[derive(Debug)]
pub enum DialErr {
    /// The socket itself couldn't be created, retrying won't help.
    Socket(io::Error),
    /// The endpoint couldn't be resolved or reached.
    Connect(io::Error),
}

impl fmt::Display for DialErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialErr::Socket(e) => write!(f, "failed to create socket: {e}"),
            DialErr::Connect(e) => write!(f, "failed to connect: {e}"),
        }
    }
}

impl Error for DialErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DialErr::Socket(e) | DialErr::Connect(e) => Some(e),
        }
    }
}

/// Opens a single stream connection per call.
pub trait Dialer {
    type Stream;

    /// Makes one connection attempt to `addr`.
    ///
    /// # Arguments
    /// * `addr` - The endpoint as `host:port`.
    fn dial(&mut self, addr: &str) -> impl Future<Output = std::result::Result<Self::Stream, DialErr>>;
}

/// Dials over TCP, creating a fresh socket for every attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&mut self, addr: &str) -> std::result::Result<TcpStream, DialErr> {
        let addr = lookup_host(addr)
            .await
            .map_err(DialErr::Connect)?
            .next()
            .ok_or_else(|| {
                let msg = format!("no address found for {addr}");
                DialErr::Connect(io::Error::new(io::ErrorKind::NotFound, msg))
            })?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(DialErr::Socket)?;

        socket.connect(addr).await.map_err(DialErr::Connect)
    }
}

/// Connects to `addr`, retrying every `retry` until an attempt succeeds.
///
/// # Arguments
/// * `dialer` - Makes the individual attempts.
/// * `addr` - The endpoint as `host:port`.
/// * `retry` - The fixed wait between attempts.
///
/// # Returns
/// The open stream, or an error only if a socket couldn't be created.
pub async fn connect<D: Dialer>(dialer: &mut D, addr: &str, retry: Duration) -> Result<D::Stream> {
    let mut attempts = 0usize;

    loop {
        attempts += 1;

        match dialer.dial(addr).await {
            Ok(stream) => {
                info!(attempts = attempts; "connected to {addr}");
                return Ok(stream);
            }
            Err(DialErr::Socket(e)) => {
                error!("failed to create socket: {e}");
                return Err(WorkerErr::Socket(e));
            }
            Err(DialErr::Connect(e)) => {
                warn!(attempts = attempts; "failed to connect to {addr}: {e}, retrying in {retry:?}");
                time::sleep(retry).await;
            }
        }
    }
}
