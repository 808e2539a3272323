use std::time::Duration;

use comms::{Batch, BatchReceiver, BatchRequest, BatchSender};
use tokio::io::{AsyncRead, AsyncWrite};

/// Data server client wrapper.
///
/// Contract: one request is written, then its whole response is read, the connection never
/// carries more than one request in flight.
pub struct BatchClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: BatchReceiver<R>,
    tx: BatchSender<W>,
}

impl<R, W> BatchClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `BatchClient` over both halves of a connection.
    ///
    /// # Arguments
    /// * `rx` - The reading half.
    /// * `tx` - The writing half.
    /// * `timeout` - Optional deadline for every response.
    pub fn new(rx: R, tx: W, timeout: Option<Duration>) -> Self {
        let (rx, tx) = comms::channel(rx, tx);

        Self {
            rx: rx.with_timeout(timeout),
            tx,
        }
    }

    /// Fetches the batch described by `req` into `batch`.
    ///
    /// # Arguments
    /// * `req` - The samples to ask for.
    /// * `batch` - The batch to overwrite with the response.
    pub async fn fetch(&mut self, req: &BatchRequest, batch: &mut Batch) -> comms::Result<()> {
        self.tx.send(req).await?;
        self.rx.recv_into(req, batch).await
    }
}
