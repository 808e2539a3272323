//! The requesting end of the batch protocol.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{BatchRequest, Result};

/// The sending end handle of the client side.
pub struct BatchSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
}

impl<W: AsyncWrite + Unpin> BatchSender<W> {
    /// Creates a new `BatchSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    pub(super) fn new(tx: W) -> Self {
        Self { tx }
    }

    /// Sends `req` through the inner writer.
    ///
    /// The request is validated first, nothing is written if its response could not be received
    /// in a single frame.
    ///
    /// # Arguments
    /// * `req` - The batch request.
    ///
    /// # Returns
    /// A result object that returns `CommsErr` on failure.
    pub async fn send(&mut self, req: &BatchRequest) -> Result<()> {
        req.validate()?;

        self.tx.write_all(&req.encode()).await?;
        self.tx.flush().await?;
        Ok(())
    }
}
