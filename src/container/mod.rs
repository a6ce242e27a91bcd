// In: src/container/mod.rs

//! The chunked container.
//!
//! A `ChunkedCodec` runs the configured filter and backend either over the whole
//! buffer or over record-aligned chunks. Chunked output is framed per chunk and
//! falls back to a raw copy as soon as it stops paying off, so a chunked stream is
//! never more than four bytes larger than its input.

pub mod codec;
pub mod framing;


pub use codec::{ChunkedCodec, ContainerMode};
