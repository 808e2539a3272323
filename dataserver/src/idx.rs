//! Decoding of the MNIST IDX files.
//!
//! Every file starts with a big-endian `u32` magic number and one big-endian `u32` per
//! dimension, followed by the raw `u8` payload.

use std::{fs, path::Path};

use comms::IMAGE_SIDE;

use crate::{DataErr, Result};

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

/// Decodes an images file.
///
/// # Returns
/// The pixels of every image, image-major and row-major.
pub fn parse_images(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut header = Header::new(bytes);
    header.magic(IMAGES_MAGIC)?;

    let count = header.dim()?;
    let rows = header.dim()?;
    let cols = header.dim()?;
    if rows as usize != IMAGE_SIDE || cols as usize != IMAGE_SIDE {
        return Err(DataErr::BadDims { rows, cols });
    }

    header.payload(count as usize * IMAGE_SIDE * IMAGE_SIDE)
}

/// Decodes a labels file.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut header = Header::new(bytes);
    header.magic(LABELS_MAGIC)?;

    let count = header.dim()?;
    header.payload(count as usize)
}

pub fn read_images(path: &Path) -> Result<Vec<u8>> {
    parse_images(&read(path)?)
}

pub fn read_labels(path: &Path) -> Result<Vec<u8>> {
    parse_labels(&read(path)?)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| DataErr::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct Header<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Header<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn magic(&mut self, expected: u32) -> Result<()> {
        match self.dim()? {
            got if got == expected => Ok(()),
            got => Err(DataErr::BadMagic { expected, got }),
        }
    }

    fn dim(&mut self) -> Result<u32> {
        let end = self.pos + size_of::<u32>();
        let Some(&[a, b, c, d]) = self.bytes.get(self.pos..end) else {
            return Err(DataErr::Truncated {
                expected: end,
                got: self.bytes.len(),
            });
        };

        self.pos = end;
        Ok(u32::from_be_bytes([a, b, c, d]))
    }

    fn payload(self, len: usize) -> Result<Vec<u8>> {
        let expected = self.pos + len;
        if self.bytes.len() != expected {
            return Err(DataErr::Truncated {
                expected,
                got: self.bytes.len(),
            });
        }

        Ok(self.bytes[self.pos..].to_vec())
    }
}

/// Encoders for hand-made corpora.
pub mod encode {
    use comms::IMAGE_SIDE;

    use super::{IMAGES_MAGIC, LABELS_MAGIC};

    pub fn images(pixels: &[u8]) -> Vec<u8> {
        let count = (pixels.len() / (IMAGE_SIDE * IMAGE_SIDE)) as u32;
        let side = IMAGE_SIDE as u32;

        [IMAGES_MAGIC, count, side, side]
            .iter()
            .flat_map(|w| w.to_be_bytes())
            .chain(pixels.iter().copied())
            .collect()
    }

    pub fn labels(labels: &[u8]) -> Vec<u8> {
        [LABELS_MAGIC, labels.len() as u32]
            .iter()
            .flat_map(|w| w.to_be_bytes())
            .chain(labels.iter().copied())
            .collect()
    }
}
