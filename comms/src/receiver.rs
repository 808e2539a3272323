use std::time::Duration;

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time,
};

use crate::{Batch, BatchRequest, CommsErr, RECV_BUF_SIZE, Result};

/// The receiving end handle of the client side.
///
/// Owns a fixed receive buffer of `RECV_BUF_SIZE` bytes that every response is read into.
pub struct BatchReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
    timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> BatchReceiver<R> {
    /// Creates a new `BatchReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: vec![0; RECV_BUF_SIZE],
            timeout: None,
        }
    }

    /// Sets a deadline for every receive, `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Waits for the response to `req` and loads it into `batch`.
    ///
    /// The whole frame must arrive before the batch is touched, if the peer closes the stream
    /// early the partial frame is discarded.
    ///
    /// # Arguments
    /// * `req` - The request this response answers.
    /// * `batch` - The batch to overwrite.
    ///
    /// # Returns
    /// A result object that returns `CommsErr` on failure.
    pub async fn recv_into(&mut self, req: &BatchRequest, batch: &mut Batch) -> Result<()> {
        let Self { rx, buf, timeout } = self;

        let len = req.validate()?;
        let batch_size = req.effective_batch_size()?;
        let frame = &mut buf[..len];
        let mut got = 0;

        match timeout {
            Some(after) => {
                let after = *after;
                let res = time::timeout(after, fill(rx, frame, &mut got)).await;
                res.map_err(|_| CommsErr::Timeout {
                    expected: len,
                    got,
                    after,
                })??
            }
            None => fill(rx, frame, &mut got).await?,
        }

        debug!(index = req.index, len = len; "received batch frame");
        batch.load(&buf[..len], batch_size)
    }
}

/// Reads until `frame` is full, keeping count of the bytes read so far in `got`.
async fn fill<R>(rx: &mut R, frame: &mut [u8], got: &mut usize) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    while *got < frame.len() {
        match rx.read(&mut frame[*got..]).await? {
            0 => {
                return Err(CommsErr::ShortResponse {
                    expected: frame.len(),
                    got: *got,
                });
            }
            n => *got += n,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SAMPLE_SIZE, channel};
    use tokio::io::{self, AsyncWriteExt};

    #[tokio::test]
    async fn reassembles_split_frames() {
        let req = BatchRequest::new(5, 2);
        let mut frame = vec![7u8; 2 * SAMPLE_SIZE];
        frame.extend([1, 9]);

        let reader = tokio_test::io::Builder::new()
            .read(&frame[..1000])
            .read(&frame[1000..])
            .build();
        let (mut rx, _) = channel(reader, io::sink());

        let mut batch = Batch::new(4);
        rx.recv_into(&req, &mut batch).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.samples(), &frame[..2 * SAMPLE_SIZE]);
        assert_eq!(batch.labels(), &[1, 9]);
    }

    #[tokio::test]
    async fn short_response_leaves_batch_untouched() {
        let req = BatchRequest::single(42);
        let reader = tokio_test::io::Builder::new().read(&[5; 100]).build();
        let (mut rx, _) = channel(reader, io::sink());

        let mut batch = Batch::new(1);
        let err = rx.recv_into(&req, &mut batch).await.unwrap_err();

        assert!(matches!(
            err,
            CommsErr::ShortResponse {
                expected: 785,
                got: 100
            }
        ));
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn read_error_is_reported() {
        let req = BatchRequest::new(0, 1);
        let reader = tokio_test::io::Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let (mut rx, _) = channel(reader, io::sink());

        let err = rx.recv_into(&req, &mut Batch::new(1)).await.unwrap_err();
        assert!(matches!(err, CommsErr::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let (client, mut server) = io::duplex(4096);
        let (rx, _) = io::split(client);
        let (mut rx, _) = channel(rx, io::sink());
        let mut rx = rx.with_timeout(Some(Duration::from_millis(500)));

        server.write_all(&[0; 10]).await.unwrap();

        let req = BatchRequest::single(0);
        let err = rx.recv_into(&req, &mut Batch::new(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CommsErr::Timeout {
                expected: 785,
                got: 10,
                ..
            }
        ));
    }
}
