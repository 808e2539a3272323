use crate::{CommsErr, Result, SAMPLE_SIZE, frame_len};

/// A reusable batch of samples and their labels.
///
/// The buffers are allocated once for `capacity` samples and overwritten by every `load`,
/// they never grow.
#[derive(Debug, Clone)]
pub struct Batch {
    samples: Vec<u8>,
    labels: Vec<u8>,
    len: usize,
}

impl Batch {
    /// Creates a new empty `Batch` able to hold up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity * SAMPLE_SIZE],
            labels: vec![0; capacity],
            len: 0,
        }
    }

    /// The amount of samples currently loaded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The maximum amount of samples this batch holds.
    pub fn capacity(&self) -> usize {
        self.labels.len()
    }

    /// The pixels of every loaded sample, sample-major and row-major.
    pub fn samples(&self) -> &[u8] {
        &self.samples[..self.len * SAMPLE_SIZE]
    }

    /// One label per loaded sample, in sample order.
    pub fn labels(&self) -> &[u8] {
        &self.labels[..self.len]
    }

    /// Returns the pixels and label of the `i`-th loaded sample.
    pub fn sample(&self, i: usize) -> Option<(&[u8], u8)> {
        if i >= self.len {
            return None;
        }

        let pixels = &self.samples[i * SAMPLE_SIZE..(i + 1) * SAMPLE_SIZE];
        Some((pixels, self.labels[i]))
    }

    /// Overwrites this batch with the contents of a response frame.
    ///
    /// # Arguments
    /// * `frame` - A full response frame, pixels first and labels last.
    /// * `batch_size` - The effective amount of samples in `frame`.
    ///
    /// # Returns
    /// An error if the batch can't hold `batch_size` samples or the frame has the wrong length.
    pub fn load(&mut self, frame: &[u8], batch_size: usize) -> Result<()> {
        let capacity = self.capacity();
        if batch_size > capacity {
            return Err(CommsErr::BatchOverflow {
                batch_size,
                capacity,
            });
        }

        let expected = frame_len(batch_size);
        if frame.len() != expected {
            return Err(CommsErr::ShortResponse {
                expected,
                got: frame.len(),
            });
        }

        let (pixels, labels) = frame.split_at(batch_size * SAMPLE_SIZE);
        self.samples[..pixels.len()].copy_from_slice(pixels);
        self.labels[..labels.len()].copy_from_slice(labels);
        self.len = batch_size;

        Ok(())
    }
}
