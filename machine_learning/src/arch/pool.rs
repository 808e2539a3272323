use ndarray::Array2;

use crate::{MlErr, Result};

/// Side length of an input image.
pub const IMAGE_SIDE: usize = 28;

/// Amount of pixels in an input image.
pub const SAMPLE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Amount of features left after pooling an image.
pub const POOLED_SIZE: usize = (IMAGE_SIDE / 2) * (IMAGE_SIDE / 2);

/// Applies a 2x2 max-pool with stride 2 to every image in `samples`.
///
/// # Arguments
/// * `samples` - Concatenated `IMAGE_SIDE x IMAGE_SIDE` row-major images.
///
/// # Returns
/// A `(images, POOLED_SIZE)` matrix with the raw intensities as `f32`.
pub fn max_pool(samples: &[u8]) -> Result<Array2<f32>> {
    if samples.len() % SAMPLE_SIZE != 0 {
        return Err(MlErr::SizeMismatch {
            what: "sample pixels",
            got: samples.len(),
            expected: (samples.len() / SAMPLE_SIZE + 1) * SAMPLE_SIZE,
        });
    }

    let n = samples.len() / SAMPLE_SIZE;
    let half = IMAGE_SIDE / 2;
    let mut out = Array2::zeros((n, POOLED_SIZE));

    for (image, mut row) in samples.chunks_exact(SAMPLE_SIZE).zip(out.rows_mut()) {
        for r in 0..half {
            for c in 0..half {
                let at = |dr, dc| image[(2 * r + dr) * IMAGE_SIDE + 2 * c + dc];
                let max = at(0, 0).max(at(0, 1)).max(at(1, 0)).max(at(1, 1));
                row[r * half + c] = max as f32;
            }
        }
    }

    Ok(out)
}
