use std::{io, net::SocketAddr, time::Duration};

use comms::proto;
use log::{debug, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    time,
};

use crate::Mnist;

/// Why a connection stopped being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closed {
    /// The peer closed the stream between requests.
    Eof,
    /// No request arrived within the idle timeout.
    Idle,
    /// The peer asked for samples outside the corpus.
    OutOfRange,
}

/// Answers the requests of a single connection until it closes, idles or misbehaves.
///
/// # Arguments
/// * `stream` - The connection.
/// * `mnist` - The corpora to serve from.
/// * `idle` - The longest wait for the next request.
///
/// # Returns
/// The amount of requests served and why the connection ended, or an I/O error.
pub async fn serve_connection<S>(stream: &mut S, mnist: &Mnist, idle: Duration) -> io::Result<(usize, Closed)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut served = 0;

    loop {
        let req = match time::timeout(idle, proto::read_request(stream)).await {
            Ok(req) => req?,
            Err(_) => {
                info!(served = served; "connection idle for {idle:?}, closing");
                return Ok((served, Closed::Idle));
            }
        };

        let Some(req) = req else {
            debug!(served = served; "peer closed the connection");
            return Ok((served, Closed::Eof));
        };

        let Some((samples, labels)) = mnist.answer(&req) else {
            warn!(index = req.index, batch_size = req.batch_size; "request out of range, closing");
            return Ok((served, Closed::OutOfRange));
        };

        debug!(index = req.index, batch_size = req.batch_size; "sending {} bytes", samples.len() + labels.len());
        proto::write_response(stream, samples, labels).await?;
        served += 1;
    }
}

/// Accepts connections on `listener` forever, serving them one at a time.
pub async fn serve(listener: TcpListener, mnist: &Mnist, idle: Duration) -> io::Result<()> {
    loop {
        let (mut stream, addr) = listener.accept().await?;
        info!("got connection from {addr}");

        handle(&mut stream, addr, mnist, idle).await;
    }
}

async fn handle<S>(stream: &mut S, addr: SocketAddr, mnist: &Mnist, idle: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match serve_connection(stream, mnist, idle).await {
        Ok((served, closed)) => info!(served = served; "connection from {addr} closed: {closed:?}"),
        Err(e) => warn!("connection from {addr} failed: {e}"),
    }
}
