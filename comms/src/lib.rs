//! Wire layer for streaming labeled image batches between a device and the data server.
//!
//! A request is 8 bytes: the index of the first sample followed by the batch size, both `i32`
//! in the native byte order of the sender. The response is a single frame with every sample's
//! pixels followed by every sample's label. A batch size of 0 asks for a single evaluation
//! sample.

mod batch;
mod error;
pub mod proto;
mod receiver;
mod request;
mod sender;

use tokio::io::{AsyncRead, AsyncWrite};

pub use batch::Batch;
pub use error::{CommsErr, Result};
pub use receiver::BatchReceiver;
pub use request::{BatchRequest, REQUEST_LEN};
pub use sender::BatchSender;

/// Side length of a square sample image.
pub const IMAGE_SIDE: usize = 28;

/// Amount of pixel bytes in a single sample.
pub const SAMPLE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Size of the receiving buffer, one byte of it is reserved for a terminator.
pub const RECV_BUF_SIZE: usize = 4096;

/// The largest response frame a receiver accepts.
pub const MAX_FRAME_LEN: usize = RECV_BUF_SIZE - 1;

/// The largest effective batch size that fits in a single response frame.
pub const MAX_BATCH_SIZE: usize = MAX_FRAME_LEN / (SAMPLE_SIZE + 1);

/// Returns the byte length of a response frame carrying `batch_size` samples.
///
/// # Arguments
/// * `batch_size` - The effective amount of samples in the frame.
///
/// # Returns
/// The amount of pixel bytes plus the amount of label bytes.
pub const fn frame_len(batch_size: usize) -> usize {
    batch_size * (SAMPLE_SIZE + 1)
}

/// Creates both `BatchReceiver` and `BatchSender` channel parts.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// The receiving and sending ends of the client side of the protocol.
pub fn channel<R, W>(rx: R, tx: W) -> (BatchReceiver<R>, BatchSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (BatchReceiver::new(rx), BatchSender::new(tx))
}
