//! This module contains the pure, stateless kernels for performing Zstandard
//! compression and decompression.
//!
//! This is a byte-stream backend. It takes a buffer that may already have been
//! reshaped by the delta filter and applies a modern entropy coder to it. The
//! module is a safe, panic-free wrapper around the `zstd` crate's bulk API.
//!
//! Frames carry no extra header: the caller always knows the decoded size, and
//! decompression writes straight into the caller's destination slice.

use crate::error::SplatPressError;

/// Quality presets: negative levels are zstd's "fast" modes.
pub const LEVELS: [i32; 5] = [-5, -1, 1, 5, 9];

//==================================================================================
// 1. Public API
//==================================================================================

/// Worst-case compressed size for `input_len` bytes.
pub fn bound(input_len: usize) -> usize {
    if input_len == 0 {
        return 0;
    }
    zstd::zstd_safe::compress_bound(input_len)
}

/// Compresses `input_bytes` into a single zstd frame. Empty input yields empty output.
pub fn compress(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, SplatPressError> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }
    zstd::bulk::compress(input_bytes, level).map_err(|e| SplatPressError::ZstdError(e.to_string()))
}

/// Decompresses a frame produced by [`compress`], filling `dst` exactly.
pub fn decompress(input_bytes: &[u8], dst: &mut [u8]) -> Result<(), SplatPressError> {
    if input_bytes.is_empty() {
        if dst.is_empty() {
            return Ok(());
        }
        return Err(SplatPressError::ZstdError(format!(
            "Empty input cannot produce {} bytes.",
            dst.len()
        )));
    }

    let written = zstd::bulk::decompress_to_buffer(input_bytes, dst)
        .map_err(|e| SplatPressError::ZstdError(e.to_string()))?;

    if written != dst.len() {
        return Err(SplatPressError::ZstdError(format!(
            "Decompressed size does not match destination. Expected {}, got {}.",
            dst.len(),
            written
        )));
    }
    Ok(())
}

//==================================================================================
// 2. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip_simple_text() {
        let original_bytes =
            b"hello world, this is a test of zstd compression. hello world, this is a test."
                .to_vec();

        for level in LEVELS {
            let compressed_bytes = compress(&original_bytes, level).unwrap();
            assert!(compressed_bytes.len() < original_bytes.len());
            assert!(compressed_bytes.len() <= bound(original_bytes.len()));

            let mut decompressed_bytes = vec![0u8; original_bytes.len()];
            decompress(&compressed_bytes, &mut decompressed_bytes).unwrap();
            assert_eq!(original_bytes, decompressed_bytes);
        }
    }

    #[test]
    fn test_zstd_roundtrip_highly_compressible_data() {
        let original_bytes = vec![42u8; 10_000];
        let compressed_bytes = compress(&original_bytes, 5).unwrap();
        assert!(compressed_bytes.len() < 50);

        let mut decompressed_bytes = vec![0u8; original_bytes.len()];
        decompress(&compressed_bytes, &mut decompressed_bytes).unwrap();
        assert_eq!(original_bytes, decompressed_bytes);
    }

    #[test]
    fn test_zstd_empty_is_empty() {
        assert!(compress(&[], 1).unwrap().is_empty());
        assert_eq!(bound(0), 0);
        decompress(&[], &mut []).unwrap();
        assert!(decompress(&[], &mut [0u8; 4]).is_err());
    }

    #[test]
    fn test_zstd_decompress_invalid_data() {
        let invalid_bytes = vec![1, 2, 3, 4, 5];
        let mut out = vec![0u8; 16];
        let result = decompress(&invalid_bytes, &mut out);

        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Zstd"));
            assert!(e.is_backend_failure());
        }
    }

    #[test]
    fn test_zstd_decompress_rejects_wrong_size() {
        let compressed = compress(&[7u8; 100], 1).unwrap();
        let mut too_big = vec![0u8; 101];
        assert!(decompress(&compressed, &mut too_big).is_err());
    }
}
