//! This module contains the pure, stateless kernel for transposing byte matrices.
//!
//! This is the byte-distribution stage of the filter. It reorganizes a row-oriented
//! `rows x cols` byte matrix (one row per record) into its `cols x rows` transpose,
//! the channel-planar layout, so that the bytes of one channel become contiguous.
//!
//! Two code paths exist:
//! * `rows == 16 && cols % 16 == 0`: the matrix is cut into 16x16 tiles and each
//!   tile is transposed in registers with an even/odd interleave butterfly.
//! * anything else: direct index remapping, `dst[c * rows + r] = src[r * cols + c]`.

use crate::error::SplatPressError;
use crate::kernels::simd::{Bytes16, Lanes16};

/// Tile edge of the register fast path.
pub const TILE: usize = 16;

//==================================================================================
// 1. Core Logic (The "Engine")
//==================================================================================

/// One butterfly round. Each round rotates the 8-bit `(row, col)` index of every
/// byte left by one bit, so four rounds turn `rrrr cccc` into `cccc rrrr`.
#[inline]
fn even_odd_interleave<V: Lanes16>(a: &[V; TILE], b: &mut [V; TILE]) {
    for i in 0..TILE / 2 {
        b[2 * i] = a[i].interleave_lo(a[i + TILE / 2]);
        b[2 * i + 1] = a[i].interleave_hi(a[i + TILE / 2]);
    }
}

/// Transposes a 16x16 byte tile held as 16 row vectors.
#[inline]
pub(crate) fn transpose_16x16<V: Lanes16>(tile: [V; TILE]) -> [V; TILE] {
    let mut a = tile;
    let mut b = [V::zero(); TILE];
    even_odd_interleave(&a, &mut b);
    even_odd_interleave(&b, &mut a);
    even_odd_interleave(&a, &mut b);
    even_odd_interleave(&b, &mut a);
    a
}

/// Transposes without validating lengths. Callers guarantee
/// `src.len() >= rows * cols` and `dst.len() >= rows * cols`.
pub(crate) fn transpose_into<V: Lanes16>(src: &[u8], dst: &mut [u8], cols: usize, rows: usize) {
    if rows == TILE && cols % TILE == 0 {
        let blocks = cols / TILE;
        for block in 0..blocks {
            let mut tile = [V::zero(); TILE];
            for (row, lane) in tile.iter_mut().enumerate() {
                *lane = V::load(&src[(row * blocks + block) * TILE..]);
            }
            let transposed = transpose_16x16(tile);
            for (k, lane) in transposed.iter().enumerate() {
                lane.store(&mut dst[(block * TILE + k) * TILE..]);
            }
        }
    } else {
        for row in 0..rows {
            let src_row = &src[row * cols..(row + 1) * cols];
            for (col, &byte) in src_row.iter().enumerate() {
                dst[col * rows + row] = byte;
            }
        }
    }
}

fn check_shape(
    src: &[u8],
    dst: &[u8],
    cols: usize,
    rows: usize,
) -> Result<(), SplatPressError> {
    let expected = cols.checked_mul(rows).ok_or_else(|| {
        SplatPressError::InternalError(format!("{} x {} matrix overflows usize", rows, cols))
    })?;
    if src.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: src.len(),
            context: "transpose source",
        });
    }
    if dst.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: dst.len(),
            context: "transpose destination",
        });
    }
    Ok(())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Transposes the `rows x cols` matrix `src` into the `cols x rows` matrix `dst`
/// using the vector backend `V`.
pub fn transpose_with<V: Lanes16>(
    src: &[u8],
    dst: &mut [u8],
    cols: usize,
    rows: usize,
) -> Result<(), SplatPressError> {
    check_shape(src, dst, cols, rows)?;
    transpose_into::<V>(src, dst, cols, rows);
    Ok(())
}

/// Transposes the `rows x cols` matrix `src` into the `cols x rows` matrix `dst`.
pub fn transpose(
    src: &[u8],
    dst: &mut [u8],
    cols: usize,
    rows: usize,
) -> Result<(), SplatPressError> {
    transpose_with::<Bytes16>(src, dst, cols, rows)
}

/// Exact inverse of [`transpose`] called with the same `cols` and `rows`:
/// `src` is the `cols x rows` planar matrix, `dst` receives the `rows x cols` original.
pub fn inverse_transpose(
    src: &[u8],
    dst: &mut [u8],
    cols: usize,
    rows: usize,
) -> Result<(), SplatPressError> {
    transpose_with::<Bytes16>(src, dst, rows, cols)
}

/// Converts `rows` interleaved records of `channels` bytes to channel-planar layout.
pub fn to_planar(src: &[u8], channels: usize, rows: usize) -> Result<Vec<u8>, SplatPressError> {
    let mut planar = vec![0u8; src.len()];
    transpose(src, &mut planar, channels, rows)?;
    Ok(planar)
}

/// Converts a channel-planar buffer back to interleaved records.
pub fn from_planar(
    planar: &[u8],
    channels: usize,
    rows: usize,
) -> Result<Vec<u8>, SplatPressError> {
    let mut interleaved = vec![0u8; planar.len()];
    inverse_transpose(planar, &mut interleaved, channels, rows)?;
    Ok(interleaved)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::simd::Portable16;

    fn matrix(cols: usize, rows: usize) -> Vec<u8> {
        (0..cols * rows)
            .map(|i| (i as u32).wrapping_mul(2_654_435_761).rotate_right(13) as u8)
            .collect()
    }

    fn reference_transpose(src: &[u8], cols: usize, rows: usize) -> Vec<u8> {
        let mut dst = vec![0u8; src.len()];
        for r in 0..rows {
            for c in 0..cols {
                dst[c * rows + r] = src[r * cols + c];
            }
        }
        dst
    }

    #[test]
    fn test_transpose_small_general_path() {
        // 2 records x 3 channels.
        let src = [1, 2, 3, 4, 5, 6];
        let planar = to_planar(&src, 3, 2).unwrap();
        assert_eq!(planar, vec![1, 4, 2, 5, 3, 6]);
        assert_eq!(from_planar(&planar, 3, 2).unwrap(), src.to_vec());
    }

    #[test]
    fn test_fast_path_matches_reference() {
        for cols in [16, 32, 48, 256] {
            let src = matrix(cols, 16);
            let mut dst = vec![0u8; src.len()];
            transpose(&src, &mut dst, cols, 16).unwrap();
            assert_eq!(dst, reference_transpose(&src, cols, 16), "cols = {}", cols);
        }
    }

    #[test]
    fn test_fast_path_portable_backend_matches_native() {
        let src = matrix(64, 16);
        let mut native = vec![0u8; src.len()];
        let mut portable = vec![0u8; src.len()];
        transpose(&src, &mut native, 64, 16).unwrap();
        transpose_with::<Portable16>(&src, &mut portable, 64, 16).unwrap();
        assert_eq!(native, portable);
    }

    #[test]
    fn test_roundtrip_many_shapes() {
        for rows in [0, 1, 3, 15, 16, 17, 33] {
            for cols in [1, 7, 8, 16, 31, 32, 248, 300] {
                let src = matrix(cols, rows);
                let mut planar = vec![0u8; src.len()];
                transpose(&src, &mut planar, cols, rows).unwrap();
                assert_eq!(planar, reference_transpose(&src, cols, rows));

                let mut back = vec![0u8; src.len()];
                inverse_transpose(&planar, &mut back, cols, rows).unwrap();
                assert_eq!(back, src, "rows = {}, cols = {}", rows, cols);
            }
        }
    }

    #[test]
    fn test_16x16_tile_is_an_involution() {
        let mut tile = [Portable16::zero(); TILE];
        for (r, row) in tile.iter_mut().enumerate() {
            for c in 0..TILE {
                *row = row.with_lane(c, (r * TILE + c) as u8);
            }
        }
        let t = transpose_16x16(tile);
        assert_eq!(t[3].lane(5), (5 * TILE + 3) as u8);
        assert_eq!(transpose_16x16(t), tile);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let src = [0u8; 10];
        let mut dst = [0u8; 10];
        let err = transpose(&src, &mut dst, 4, 3).unwrap_err();
        assert!(err.is_contract_violation());

        let src = [0u8; 12];
        let err = transpose(&src, &mut dst, 4, 3).unwrap_err();
        assert!(matches!(
            err,
            SplatPressError::LayoutMismatch {
                context: "transpose destination",
                ..
            }
        ));
    }
}
