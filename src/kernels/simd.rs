//! A portable 16-lane byte vector abstraction.
//!
//! The transpose and delta kernels are written once against the `Lanes16` trait.
//! Two implementations exist:
//! * `Portable16`, a plain `[u8; 16]` that every target can use, and
//! * `Sse2x16`, backed by `__m128i` on x86_64 (SSE2 is part of the base ISA there).
//!
//! `Bytes16` names the best implementation for the compilation target. Both
//! implementations must agree bit-for-bit; the tests below pin that down.

//==================================================================================
// 1. The Vector Contract
//==================================================================================

/// Sixteen `u8` lanes with wrapping arithmetic.
pub trait Lanes16: Copy {
    fn zero() -> Self;
    fn splat(value: u8) -> Self;

    /// Loads the first 16 bytes of `src`. Panics if `src` is shorter.
    fn load(src: &[u8]) -> Self;
    /// Stores into the first 16 bytes of `dst`. Panics if `dst` is shorter.
    fn store(self, dst: &mut [u8]);

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;

    /// Table lookup: lane `i` becomes `self[table[i] & 15]`, or 0 when bit 7 of
    /// `table[i]` is set.
    fn shuffle(self, table: Self) -> Self;

    /// `[a0, b0, a1, b1, .., a7, b7]`.
    fn interleave_lo(self, rhs: Self) -> Self;
    /// `[a8, b8, a9, b9, .., a15, b15]`.
    fn interleave_hi(self, rhs: Self) -> Self;

    /// Inclusive prefix sum across lanes.
    fn prefix_sum(self) -> Self;

    fn lane(self, index: usize) -> u8;
    fn with_lane(self, index: usize, value: u8) -> Self;

    /// Byte-align the pair `(self:prev)` right by 15 lanes:
    /// `[prev[15], self[0], .., self[14]]`.
    fn concat_prev(self, prev: Self) -> Self;
}

/// Index of the last lane, used to carry state between 16-element groups.
pub const LAST_LANE: usize = 15;

//==================================================================================
// 2. Scalar Fallback
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Portable16(pub [u8; 16]);

impl Lanes16 for Portable16 {
    #[inline]
    fn zero() -> Self {
        Self([0; 16])
    }

    #[inline]
    fn splat(value: u8) -> Self {
        Self([value; 16])
    }

    #[inline]
    fn load(src: &[u8]) -> Self {
        let mut lanes = [0u8; 16];
        lanes.copy_from_slice(&src[..16]);
        Self(lanes)
    }

    #[inline]
    fn store(self, dst: &mut [u8]) {
        dst[..16].copy_from_slice(&self.0);
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o = o.wrapping_add(r);
        }
        Self(out)
    }

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o = o.wrapping_sub(r);
        }
        Self(out)
    }

    #[inline]
    fn shuffle(self, table: Self) -> Self {
        let mut out = [0u8; 16];
        for (o, &t) in out.iter_mut().zip(table.0.iter()) {
            *o = if t & 0x80 != 0 { 0 } else { self.0[(t & 0x0F) as usize] };
        }
        Self(out)
    }

    #[inline]
    fn interleave_lo(self, rhs: Self) -> Self {
        let mut out = [0u8; 16];
        for i in 0..8 {
            out[2 * i] = self.0[i];
            out[2 * i + 1] = rhs.0[i];
        }
        Self(out)
    }

    #[inline]
    fn interleave_hi(self, rhs: Self) -> Self {
        let mut out = [0u8; 16];
        for i in 0..8 {
            out[2 * i] = self.0[8 + i];
            out[2 * i + 1] = rhs.0[8 + i];
        }
        Self(out)
    }

    #[inline]
    fn prefix_sum(self) -> Self {
        let mut out = self.0;
        for i in 1..16 {
            out[i] = out[i].wrapping_add(out[i - 1]);
        }
        Self(out)
    }

    #[inline]
    fn lane(self, index: usize) -> u8 {
        self.0[index]
    }

    #[inline]
    fn with_lane(self, index: usize, value: u8) -> Self {
        let mut out = self.0;
        out[index] = value;
        Self(out)
    }

    #[inline]
    fn concat_prev(self, prev: Self) -> Self {
        let mut out = [0u8; 16];
        out[0] = prev.0[LAST_LANE];
        out[1..].copy_from_slice(&self.0[..15]);
        Self(out)
    }
}

//==================================================================================
// 3. x86_64 SSE2 Implementation
//==================================================================================

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
mod sse2 {
    use super::{Lanes16, Portable16};
    use std::arch::x86_64::*;

    #[derive(Debug, Clone, Copy)]
    pub struct Sse2x16(__m128i);

    impl Sse2x16 {
        #[inline]
        fn to_array(self) -> [u8; 16] {
            let mut out = [0u8; 16];
            self.store(&mut out);
            out
        }

        #[inline]
        fn from_array(lanes: [u8; 16]) -> Self {
            Self::load(&lanes)
        }
    }

    // SAFETY (whole impl): SSE2 is statically enabled by the cfg on this module, and
    // every unaligned load/store is preceded by a slice bounds check of 16 bytes.
    impl Lanes16 for Sse2x16 {
        #[inline]
        fn zero() -> Self {
            Self(unsafe { _mm_setzero_si128() })
        }

        #[inline]
        fn splat(value: u8) -> Self {
            Self(unsafe { _mm_set1_epi8(value as i8) })
        }

        #[inline]
        fn load(src: &[u8]) -> Self {
            let src = &src[..16];
            Self(unsafe { _mm_loadu_si128(src.as_ptr() as *const __m128i) })
        }

        #[inline]
        fn store(self, dst: &mut [u8]) {
            let dst = &mut dst[..16];
            unsafe { _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, self.0) }
        }

        #[inline]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { _mm_add_epi8(self.0, rhs.0) })
        }

        #[inline]
        fn sub(self, rhs: Self) -> Self {
            Self(unsafe { _mm_sub_epi8(self.0, rhs.0) })
        }

        #[inline]
        fn shuffle(self, table: Self) -> Self {
            // No byte shuffle before SSSE3.
            let shuffled = Portable16(self.to_array()).shuffle(Portable16(table.to_array()));
            Self::from_array(shuffled.0)
        }

        #[inline]
        fn interleave_lo(self, rhs: Self) -> Self {
            Self(unsafe { _mm_unpacklo_epi8(self.0, rhs.0) })
        }

        #[inline]
        fn interleave_hi(self, rhs: Self) -> Self {
            Self(unsafe { _mm_unpackhi_epi8(self.0, rhs.0) })
        }

        #[inline]
        fn prefix_sum(self) -> Self {
            // Kogge-Stone: log2(16) shifted adds.
            unsafe {
                let mut x = self.0;
                x = _mm_add_epi8(x, _mm_slli_si128::<1>(x));
                x = _mm_add_epi8(x, _mm_slli_si128::<2>(x));
                x = _mm_add_epi8(x, _mm_slli_si128::<4>(x));
                x = _mm_add_epi8(x, _mm_slli_si128::<8>(x));
                Self(x)
            }
        }

        #[inline]
        fn lane(self, index: usize) -> u8 {
            self.to_array()[index]
        }

        #[inline]
        fn with_lane(self, index: usize, value: u8) -> Self {
            let mut lanes = self.to_array();
            lanes[index] = value;
            Self::from_array(lanes)
        }

        #[inline]
        fn concat_prev(self, prev: Self) -> Self {
            Self(unsafe { _mm_or_si128(_mm_slli_si128::<1>(self.0), _mm_srli_si128::<15>(prev.0)) })
        }
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
pub use sse2::Sse2x16;

/// The native vector type for this target.
#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
pub type Bytes16 = Sse2x16;

/// The native vector type for this target.
#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
pub type Bytes16 = Portable16;

//==================================================================================
// 4. Unit Tests
//==================================================================================
