//! Conversions between the opaque parameters blob and the network's flat `f32` parameters.
//!
//! The blob is every layer's row-major `(inputs, outputs)` weight matrix, in layer order,
//! as little-endian `f32`s.

use rand::{Rng, distr::Uniform};

use crate::{MlErr, Result, arch::MnistNet};

/// Exact length in bytes of a parameters blob.
pub const BLOB_LEN: usize = MnistNet::SIZE * size_of::<f32>();

/// Decodes a parameters blob.
///
/// # Arguments
/// * `blob` - Exactly `BLOB_LEN` bytes.
///
/// # Returns
/// The network's parameters or an error if the blob has the wrong length.
pub fn from_blob(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() != BLOB_LEN {
        return Err(MlErr::BlobLength {
            got: blob.len(),
            expected: BLOB_LEN,
        });
    }

    let params = blob
        .chunks_exact(size_of::<f32>())
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(params)
}

/// Encodes `params` as a parameters blob.
pub fn to_blob(params: &[f32]) -> Vec<u8> {
    params.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Draws a fresh blob, each layer uniform in `±1/sqrt(fan_in)`.
///
/// # Arguments
/// * `rng` - The random number generator.
pub fn random<R: Rng>(rng: &mut R) -> Result<Vec<u8>> {
    let mut params = Vec::with_capacity(MnistNet::SIZE);

    for (fan_in, size) in MnistNet::layout() {
        let bound = 1.0 / (fan_in as f32).sqrt();
        let dist = Uniform::new(-bound, bound).map_err(|e| MlErr::Init(e.to_string()))?;
        params.extend((0..size).map(|_| rng.sample(&dist)));
    }

    Ok(to_blob(&params))
}
