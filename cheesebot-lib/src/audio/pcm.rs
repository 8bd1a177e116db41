//! Signed 16-bit little-endian PCM arithmetic on raw byte chunks.

use crate::constants::SAMPLE_WIDTH;

/// Scale every sample of `chunk` by `factor` in place.
///
/// Products are floored and clamped to the `i16` range. A trailing odd byte
/// is left untouched.
pub fn scale(chunk: &mut [u8], factor: f64) {
    for pair in chunk.chunks_exact_mut(SAMPLE_WIDTH) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]) as f64;
        let scaled = (sample * factor)
            .floor()
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        pair.copy_from_slice(&scaled.to_le_bytes());
    }
}

/// Add `chunk` into `acc` sample-wise with saturation.
///
/// Only the overlapping whole samples of both buffers are summed.
pub fn add(acc: &mut [u8], chunk: &[u8]) {
    for (out, pair) in acc
        .chunks_exact_mut(SAMPLE_WIDTH)
        .zip(chunk.chunks_exact(SAMPLE_WIDTH))
    {
        let a = i16::from_le_bytes([out[0], out[1]]);
        let b = i16::from_le_bytes([pair[0], pair[1]]);
        out.copy_from_slice(&a.saturating_add(b).to_le_bytes());
    }
}

/// Decode a chunk into `f32` samples in `[-1.0, 1.0)`.
pub fn to_f32(chunk: &[u8]) -> impl Iterator<Item = f32> + '_ {
    chunk
        .chunks_exact(SAMPLE_WIDTH)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
}

/// Encode samples as a little-endian byte chunk.
pub fn from_samples(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Decode a little-endian byte chunk into samples.
pub fn to_samples(chunk: &[u8]) -> Vec<i16> {
    chunk
        .chunks_exact(SAMPLE_WIDTH)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
