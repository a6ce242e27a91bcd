//! This module contains the byte-delta filter: an order-1 delta per record byte
//! ("channel"), emitted in channel-planar layout.
//!
//! Forward, for every channel `c` and element `i`:
//! `dst[c * n + i] = src[i * channels + c] - src[(i - 1) * channels + c]` (mod 256),
//! with the previous byte of element 0 taken as zero.
//!
//! The main loop fetches 16 records at a time, transposes them so each channel
//! holds 16 contiguous bytes, and deltas those with one vector subtract. The
//! inverse undoes the delta with a 16-lane prefix sum seeded by the previous
//! group's last lane, then transposes back. Leftover elements (fewer than 16)
//! go through a scalar tail that continues the same running state, so the result
//! is bit-identical to a purely sequential per-channel delta.

use crate::error::SplatPressError;
use crate::kernels::simd::{Bytes16, Lanes16, LAST_LANE};
use crate::kernels::transpose::{transpose_into, TILE};

/// The maximum number of channels (record bytes) a single filter call supports.
pub const MAX_CHANNELS: usize = 256;

//==================================================================================
// 1. Validation
//==================================================================================

fn check_args(
    src: &[u8],
    dst: &[u8],
    channels: usize,
    elements: usize,
) -> Result<(), SplatPressError> {
    if channels > MAX_CHANNELS {
        return Err(SplatPressError::TooManyChannels(channels, MAX_CHANNELS));
    }
    let expected = channels.checked_mul(elements).ok_or_else(|| {
        SplatPressError::InternalError(format!(
            "{} channels x {} elements overflows usize",
            channels, elements
        ))
    })?;
    if src.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: src.len(),
            context: "delta filter source",
        });
    }
    if dst.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: dst.len(),
            context: "delta filter destination",
        });
    }
    Ok(())
}

//==================================================================================
// 2. Core Logic (The "Engine")
//==================================================================================

/// Forward filter with an explicit vector backend.
pub fn filter_with<V: Lanes16>(
    src: &[u8],
    dst: &mut [u8],
    channels: usize,
    elements: usize,
) -> Result<(), SplatPressError> {
    check_args(src, dst, channels, elements)?;
    if channels == 0 || elements == 0 {
        return Ok(());
    }

    let group_bytes = channels * TILE;
    let mut prev = vec![V::zero(); channels];
    let mut transposed = vec![0u8; group_bytes];

    let mut ip = 0;
    while ip + TILE <= elements {
        // 16 records -> one 16-byte vector per channel.
        let group = &src[ip * channels..ip * channels + group_bytes];
        transpose_into::<V>(group, &mut transposed, channels, TILE);
        for (ch, carried) in prev.iter_mut().enumerate() {
            let v = V::load(&transposed[ch * TILE..]);
            let delta = v.sub(v.concat_prev(*carried));
            delta.store(&mut dst[ch * elements + ip..]);
            *carried = v;
        }
        ip += TILE;
    }

    if ip < elements {
        let mut prev1: Vec<u8> = prev.iter().map(|v| v.lane(LAST_LANE)).collect();
        for i in ip..elements {
            let record = &src[i * channels..(i + 1) * channels];
            for (ch, (&v, carried)) in record.iter().zip(prev1.iter_mut()).enumerate() {
                dst[ch * elements + i] = v.wrapping_sub(*carried);
                *carried = v;
            }
        }
    }
    Ok(())
}

/// Inverse filter with an explicit vector backend.
pub fn unfilter_with<V: Lanes16>(
    src: &[u8],
    dst: &mut [u8],
    channels: usize,
    elements: usize,
) -> Result<(), SplatPressError> {
    check_args(src, dst, channels, elements)?;
    if channels == 0 || elements == 0 {
        return Ok(());
    }

    let group_bytes = channels * TILE;
    let last_lane = V::splat(LAST_LANE as u8);
    let mut curr = vec![V::zero(); channels];
    let mut planar_group = vec![0u8; group_bytes];

    let mut ip = 0;
    while ip + TILE <= elements {
        for (ch, running) in curr.iter_mut().enumerate() {
            let diff = V::load(&src[ch * elements + ip..]);
            *running = diff.prefix_sum().add(running.shuffle(last_lane));
            running.store(&mut planar_group[ch * TILE..]);
        }
        // channels x 16 -> 16 interleaved records.
        let out = &mut dst[ip * channels..ip * channels + group_bytes];
        transpose_into::<V>(&planar_group, out, TILE, channels);
        ip += TILE;
    }

    if ip < elements {
        let mut curr1: Vec<u8> = curr.iter().map(|v| v.lane(LAST_LANE)).collect();
        for i in ip..elements {
            let record = &mut dst[i * channels..(i + 1) * channels];
            for (ch, (out, running)) in record.iter_mut().zip(curr1.iter_mut()).enumerate() {
                *running = src[ch * elements + i].wrapping_add(*running);
                *out = *running;
            }
        }
    }
    Ok(())
}

//==================================================================================
// 3. Public API
//==================================================================================

/// Filters `elements` interleaved records of `channels` bytes into planar deltas.
pub fn filter(
    src: &[u8],
    dst: &mut [u8],
    channels: usize,
    elements: usize,
) -> Result<(), SplatPressError> {
    filter_with::<Bytes16>(src, dst, channels, elements)
}

/// Exact inverse of [`filter`].
pub fn unfilter(
    src: &[u8],
    dst: &mut [u8],
    channels: usize,
    elements: usize,
) -> Result<(), SplatPressError> {
    unfilter_with::<Bytes16>(src, dst, channels, elements)
}

/// Owned-buffer convenience over [`filter`].
pub fn encode(src: &[u8], channels: usize, elements: usize) -> Result<Vec<u8>, SplatPressError> {
    let mut out = vec![0u8; src.len()];
    filter(src, &mut out, channels, elements)?;
    Ok(out)
}

/// Owned-buffer convenience over [`unfilter`].
pub fn decode(src: &[u8], channels: usize, elements: usize) -> Result<Vec<u8>, SplatPressError> {
    let mut out = vec![0u8; src.len()];
    unfilter(src, &mut out, channels, elements)?;
    Ok(out)
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::simd::Portable16;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Purely sequential per-channel delta, the behavioral reference.
    fn reference_filter(src: &[u8], channels: usize, elements: usize) -> Vec<u8> {
        let mut dst = vec![0u8; src.len()];
        for ch in 0..channels {
            let mut prev = 0u8;
            for i in 0..elements {
                let v = src[i * channels + ch];
                dst[ch * elements + i] = v.wrapping_sub(prev);
                prev = v;
            }
        }
        dst
    }

    fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rng.fill(&mut bytes[..]);
        bytes
    }

    #[test]
    fn test_three_records_stride_eight_uses_scalar_tail() {
        let src: Vec<u8> = (0..24).collect();
        let filtered = encode(&src, 8, 3).unwrap();

        // Per channel c: [c, (c + 8) - c, (c + 16) - (c + 8)] = [c, 8, 8].
        for ch in 0..8 {
            assert_eq!(&filtered[ch * 3..ch * 3 + 3], &[ch as u8, 8, 8]);
        }
        assert_eq!(filtered, reference_filter(&src, 8, 3));
        assert_eq!(decode(&filtered, 8, 3).unwrap(), src);
    }

    #[test]
    fn test_matches_sequential_reference_across_shapes() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for channels in [1, 3, 8, 15, 16, 17, 32, 59, 248, 256] {
            for elements in [0, 1, 15, 16, 17, 31, 32, 47, 100] {
                let src = random_bytes(&mut rng, channels * elements);
                let filtered = encode(&src, channels, elements).unwrap();
                assert_eq!(
                    filtered,
                    reference_filter(&src, channels, elements),
                    "channels = {}, elements = {}",
                    channels,
                    elements
                );
                assert_eq!(decode(&filtered, channels, elements).unwrap(), src);
            }
        }
    }

    #[test]
    fn test_roundtrip_every_channel_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for channels in 1..=MAX_CHANNELS {
            let elements = 16 + (channels % 19);
            let src = random_bytes(&mut rng, channels * elements);
            let filtered = encode(&src, channels, elements).unwrap();
            let restored = decode(&filtered, channels, elements).unwrap();
            assert_eq!(restored, src, "channels = {}", channels);
        }
    }

    #[test]
    fn test_portable_backend_is_bit_identical() {
        let mut rng = StdRng::seed_from_u64(99);
        let (channels, elements) = (48, 70);
        let src = random_bytes(&mut rng, channels * elements);

        let mut native = vec![0u8; src.len()];
        let mut portable = vec![0u8; src.len()];
        filter(&src, &mut native, channels, elements).unwrap();
        filter_with::<Portable16>(&src, &mut portable, channels, elements).unwrap();
        assert_eq!(native, portable);

        let mut restored = vec![0u8; src.len()];
        unfilter_with::<Portable16>(&native, &mut restored, channels, elements).unwrap();
        assert_eq!(restored, src);
    }

    #[test]
    fn test_smooth_channels_become_small_deltas() {
        // Records of one little-endian u16 that increases by 3 each step.
        let elements = 40;
        let src: Vec<u8> = (0..elements as u16)
            .flat_map(|i| (1000 + 3 * i).to_le_bytes())
            .collect();
        let filtered = encode(&src, 2, elements).unwrap();
        assert!(filtered[1..elements].iter().all(|&d| d == 3));
    }

    #[test]
    fn test_too_many_channels_fails_fast() {
        let src = vec![0u8; 257];
        let mut dst = vec![0u8; 257];
        let err = filter(&src, &mut dst, 257, 1).unwrap_err();
        assert!(matches!(err, SplatPressError::TooManyChannels(257, MAX_CHANNELS)));
        assert!(unfilter(&src, &mut dst, 257, 1).is_err());
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let src = vec![0u8; 23];
        let mut dst = vec![0u8; 24];
        assert!(filter(&src, &mut dst, 8, 3).unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_element_count_overflow_is_an_error() {
        let src = vec![0u8; 6];
        let mut dst = vec![0u8; 6];
        let elements = usize::MAX / 2 + 2;
        let err = filter(&src, &mut dst, 2, elements).unwrap_err();
        assert!(matches!(err, SplatPressError::InternalError(_)));
        assert!(unfilter(&src, &mut dst, 2, elements).is_err());
        assert!(decode(&src, 2, elements).is_err());
    }
}
