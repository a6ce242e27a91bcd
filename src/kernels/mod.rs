//! This module contains the pure, stateless kernels of the codec.
//!
//! Every kernel works on plain byte slices and knows nothing about configuration
//! or framing. The `backend` and `container` modules compose them.

pub mod byte_delta;
pub mod lz4;
pub mod simd;
pub mod transpose;
pub mod vertex_codec;
pub mod zstd;
