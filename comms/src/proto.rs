//! The serving end of the batch protocol.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{BatchRequest, REQUEST_LEN, SAMPLE_SIZE};

/// Reads the next 8 bytes request from `src`.
///
/// # Returns
/// `None` if the peer closed the stream between requests, the request otherwise.
pub async fn read_request<R>(src: &mut R) -> io::Result<Option<BatchRequest>>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = [0; REQUEST_LEN];
    let mut got = 0;

    while got < REQUEST_LEN {
        match src.read(&mut bytes[got..]).await? {
            0 if got == 0 => return Ok(None),
            0 => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("request cut after {got} of {REQUEST_LEN} bytes"),
                ));
            }
            n => got += n,
        }
    }

    Ok(Some(BatchRequest::decode(bytes)))
}

/// Writes a response frame made of `samples` followed by `labels` into `sink`.
///
/// # Arguments
/// * `samples` - The pixels of every sample, `SAMPLE_SIZE` bytes each.
/// * `labels` - One label per sample.
pub async fn write_response<W>(sink: &mut W, samples: &[u8], labels: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if samples.len() != labels.len() * SAMPLE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} pixel bytes don't match {} labels",
                samples.len(),
                labels.len()
            ),
        ));
    }

    sink.write_all(samples).await?;
    sink.write_all(labels).await?;
    sink.flush().await
}
