//! This module contains the pure, stateless kernels for LZ4 block compression.
//!
//! It wraps the `lz4` crate's raw block API (no size prefix; the caller always
//! knows the decoded size). Levels select the compressor:
//! * negative levels use the fast compressor with acceleration `-level * 10`,
//! * zero is the default fast compressor,
//! * positive levels use LZ4-HC at that level.

use lz4::block::CompressionMode;

use crate::error::SplatPressError;

/// Quality presets, from fastest to densest.
pub const LEVELS: [i32; 4] = [-5, 0, 1, 9];

/// Maps a level to the `lz4` compression mode.
fn mode_for(level: i32) -> CompressionMode {
    match level {
        l if l > 0 => CompressionMode::HIGHCOMPRESSION(l),
        0 => CompressionMode::DEFAULT,
        l => CompressionMode::FAST(l.saturating_neg().saturating_mul(10)),
    }
}

/// Worst-case compressed size for `input_len` bytes.
pub fn bound(input_len: usize) -> usize {
    if input_len == 0 {
        return 0;
    }
    // LZ4_COMPRESSBOUND, for inputs the crate refuses to size.
    lz4::block::compress_bound(input_len).unwrap_or(input_len + input_len / 255 + 16)
}

/// Compresses `input_bytes` as one LZ4 block. Empty input yields empty output.
pub fn compress(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, SplatPressError> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }
    lz4::block::compress(input_bytes, Some(mode_for(level)), false)
        .map_err(|e| SplatPressError::Lz4Error(e.to_string()))
}

/// Decompresses a block produced by [`compress`], filling `dst` exactly.
pub fn decompress(input_bytes: &[u8], dst: &mut [u8]) -> Result<(), SplatPressError> {
    if input_bytes.is_empty() {
        if dst.is_empty() {
            return Ok(());
        }
        return Err(SplatPressError::Lz4Error(format!(
            "Empty input cannot produce {} bytes.",
            dst.len()
        )));
    }

    let expected = i32::try_from(dst.len()).map_err(|_| {
        SplatPressError::Lz4Error(format!("{} bytes exceed the LZ4 block limit", dst.len()))
    })?;
    let written = lz4::block::decompress_to_buffer(input_bytes, Some(expected), dst)
        .map_err(|e| SplatPressError::Lz4Error(e.to_string()))?;
    if written != dst.len() {
        return Err(SplatPressError::Lz4Error(format!(
            "Decompressed size does not match destination. Expected {}, got {}.",
            dst.len(),
            written
        )));
    }
    Ok(())
}
