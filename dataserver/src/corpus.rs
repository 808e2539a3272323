use std::path::Path;

use comms::{BatchRequest, SAMPLE_SIZE};
use log::info;

use crate::{DataErr, Result, idx};

/// A labeled set of images addressed by a contiguous sample index.
#[derive(Debug, Clone)]
pub struct Corpus {
    samples: Vec<u8>,
    labels: Vec<u8>,
}

impl Corpus {
    /// Creates a new `Corpus`.
    ///
    /// # Arguments
    /// * `samples` - `SAMPLE_SIZE` pixel bytes per image.
    /// * `labels` - One label per image.
    pub fn new(samples: Vec<u8>, labels: Vec<u8>) -> Result<Self> {
        if samples.len() != labels.len() * SAMPLE_SIZE {
            return Err(DataErr::CountMismatch {
                samples: samples.len() / SAMPLE_SIZE,
                labels: labels.len(),
            });
        }

        Ok(Self { samples, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns `count` consecutive samples starting at `index`.
    ///
    /// # Returns
    /// The pixels and labels of the range, or `None` if it isn't fully inside the corpus.
    pub fn slice(&self, index: usize, count: usize) -> Option<(&[u8], &[u8])> {
        let end = index.checked_add(count)?;
        if end > self.len() {
            return None;
        }

        let samples = &self.samples[index * SAMPLE_SIZE..end * SAMPLE_SIZE];
        Some((samples, &self.labels[index..end]))
    }
}

/// The MNIST training and test corpora.
#[derive(Debug, Clone)]
pub struct Mnist {
    pub train: Corpus,
    pub test: Corpus,
}

impl Mnist {
    /// Loads the four IDX files found in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let corpus = |images: &str, labels: &str| {
            let samples = idx::read_images(&dir.join(images))?;
            let labels = idx::read_labels(&dir.join(labels))?;
            Corpus::new(samples, labels)
        };

        let train = corpus("train-images-idx3-ubyte", "train-labels-idx1-ubyte")?;
        let test = corpus("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte")?;
        info!(train = train.len(), test = test.len(); "loaded mnist from {}", dir.display());

        Ok(Self { train, test })
    }

    /// Resolves `req` into the samples that answer it.
    ///
    /// A batch size of 0 asks for a single test sample, any other for training samples.
    ///
    /// # Returns
    /// The pixels and labels to send, or `None` if the request is out of range.
    pub fn answer(&self, req: &BatchRequest) -> Option<(&[u8], &[u8])> {
        let index = usize::try_from(req.index).ok()?;

        match req.batch_size {
            0 => self.test.slice(index, 1),
            bs => self.train.slice(index, usize::try_from(bs).ok()?),
        }
    }
}
