//! This module provides a set of shared, low-level utility functions used
//! throughout the splatpress core.
//!
//! Its primary responsibilities include:
//! 1.  Providing safe, validated conversions between raw byte slices and typed slices.
//! 2.  Reading and writing the little-endian `u32` headers used by the container
//!     and the vertex backend framing.

use crate::error::SplatPressError;

//==================================================================================
// 1. Typed Slice Conversions
//==================================================================================

/// Safely reinterprets a byte slice as a slice of plain-old-data records.
///
/// # Errors
/// Returns a `SplatPressError::PodCast` if the byte slice length is not a multiple
/// of the size of `T` or if the slice is misaligned for `T`.
pub fn safe_bytes_to_typed_slice<T>(bytes: &[u8]) -> Result<&[T], SplatPressError>
where
    T: bytemuck::Pod,
{
    Ok(bytemuck::try_cast_slice(bytes)?)
}

/// Views a slice of plain-old-data records as its raw bytes.
pub fn typed_slice_to_bytes<T>(slice: &[T]) -> &[u8]
where
    T: bytemuck::Pod,
{
    bytemuck::cast_slice(slice)
}

//==================================================================================
// 2. Little-Endian Header Helpers
//==================================================================================

/// Size in bytes of every length header in the crate's formats.
pub const U32_HEADER_SIZE: usize = 4;

/// Reads a little-endian `u32` at `offset`, or `None` if fewer than four bytes remain.
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(U32_HEADER_SIZE)?;
    let raw: [u8; U32_HEADER_SIZE] = bytes.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Appends `value` as a little-endian `u32` length header.
pub fn push_u32_le(out: &mut Vec<u8>, value: usize) -> Result<(), SplatPressError> {
    let value = u32::try_from(value).map_err(|_| {
        SplatPressError::InternalError(format!(
            "length {} does not fit in a 32-bit header",
            value
        ))
    })?;
    out.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Returns the index of the first differing byte, or `None` if the slices are equal.
pub fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    if a.len() != b.len() {
        let common = a.len().min(b.len());
        return Some(
            a.iter()
                .zip(b)
                .position(|(x, y)| x != y)
                .unwrap_or(common),
        );
    }
    a.iter().zip(b).position(|(x, y)| x != y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_header_roundtrip() {
        let mut buf = vec![0xAA];
        push_u32_le(&mut buf, 65_288).unwrap();
        assert_eq!(buf.len(), 5);
        assert_eq!(read_u32_le(&buf, 1), Some(65_288));
        assert_eq!(read_u32_le(&buf, 2), None);
    }

    #[test]
    fn test_read_u32_le_overflowing_offset() {
        assert_eq!(read_u32_le(&[1, 2, 3, 4], usize::MAX - 1), None);
    }

    #[test]
    fn test_typed_slice_views() {
        let floats = [1.0f32, -2.5];
        let bytes = typed_slice_to_bytes(&floats);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());

        let back = safe_bytes_to_typed_slice::<f32>(bytes).unwrap();
        assert_eq!(back, &floats);

        let result = safe_bytes_to_typed_slice::<f32>(&bytes[..7]);
        assert!(matches!(result, Err(SplatPressError::PodCast(_))));
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(b"abcd", b"abcd"), None);
        assert_eq!(first_difference(b"abcd", b"abXd"), Some(2));
        assert_eq!(first_difference(b"abc", b"abcd"), Some(3));
    }
}
