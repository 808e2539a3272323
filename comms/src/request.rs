use crate::{CommsErr, MAX_FRAME_LEN, Result, frame_len};

/// Size in bytes of an encoded request.
pub const REQUEST_LEN: usize = 8;

/// A request for `batch_size` samples starting at `index`.
///
/// A `batch_size` of 0 is sent as is, both ends read it as a single evaluation sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRequest {
    pub index: i32,
    pub batch_size: i32,
}

impl BatchRequest {
    /// Creates a new `BatchRequest`.
    ///
    /// # Arguments
    /// * `index` - The corpus offset of the first sample.
    /// * `batch_size` - The amount of samples, 0 for a single evaluation sample.
    pub fn new(index: i32, batch_size: i32) -> Self {
        Self { index, batch_size }
    }

    /// A request for the single evaluation sample at `index`.
    pub fn single(index: i32) -> Self {
        Self::new(index, 0)
    }

    pub fn is_single(&self) -> bool {
        self.batch_size == 0
    }

    /// Returns the amount of samples the response carries.
    ///
    /// # Returns
    /// The batch size with the sentinel 0 mapped to 1, or an error if it's negative.
    pub fn effective_batch_size(&self) -> Result<usize> {
        match self.batch_size {
            0 => Ok(1),
            bs if bs > 0 => Ok(bs as usize),
            bs => Err(CommsErr::InvalidBatchSize(bs)),
        }
    }

    /// Returns the exact length of the response frame for this request.
    pub fn response_len(&self) -> Result<usize> {
        self.effective_batch_size().map(frame_len)
    }

    /// Checks that the response to this request fits in a single receive.
    ///
    /// # Returns
    /// The response length or an error if it would exceed the receive capacity.
    pub fn validate(&self) -> Result<usize> {
        let batch_size = self.effective_batch_size()?;
        let len = frame_len(batch_size);

        if len > MAX_FRAME_LEN {
            return Err(CommsErr::FrameTooLarge {
                batch_size,
                len,
                capacity: MAX_FRAME_LEN,
            });
        }

        Ok(len)
    }

    /// Encodes the request in the native byte order.
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        bytemuck::cast([self.index, self.batch_size])
    }

    /// Decodes a request written by `encode` on a platform of the same byte order.
    pub fn decode(bytes: [u8; REQUEST_LEN]) -> Self {
        let [index, batch_size]: [i32; 2] = bytemuck::cast(bytes);
        Self { index, batch_size }
    }
}
