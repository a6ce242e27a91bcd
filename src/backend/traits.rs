//! Defines the `Compressor` capability interface and implements it for every
//! `Backend` variant.
//!
//! The interface is deliberately sized-in, sized-out: callers always know the
//! record count and stride of what they are compressing, and they always provide
//! a destination of exactly the decoded size.

use crate::backend::models::{Backend, ByteCodec};
use crate::error::SplatPressError;
use crate::kernels::vertex_codec;
use crate::utils::{push_u32_le, read_u32_le, U32_HEADER_SIZE};

/// A lossless compressor over fixed-stride record arrays.
pub trait Compressor {
    /// Stable identifier used in configuration names.
    fn name(&self) -> String;

    /// Supported quality levels, ascending.
    fn levels(&self) -> Vec<i32>;

    /// Worst-case compressed size for `item_count` records of `item_stride` bytes.
    fn bound(&self, item_count: usize, item_stride: usize) -> usize;

    fn compress(
        &self,
        level: i32,
        data: &[u8],
        item_count: usize,
        item_stride: usize,
    ) -> Result<Vec<u8>, SplatPressError>;

    /// Restores exactly `dst.len() == item_count * item_stride` bytes.
    fn decompress(
        &self,
        compressed: &[u8],
        item_count: usize,
        item_stride: usize,
        dst: &mut [u8],
    ) -> Result<(), SplatPressError>;
}

//==================================================================================
// 1. Helpers
//==================================================================================

fn check_len(
    len: usize,
    item_count: usize,
    item_stride: usize,
    context: &'static str,
) -> Result<(), SplatPressError> {
    let expected = item_count.checked_mul(item_stride).ok_or_else(|| {
        SplatPressError::InternalError(format!(
            "{} records of {} bytes overflow usize",
            item_count, item_stride
        ))
    })?;
    if len != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: len,
            context,
        });
    }
    Ok(())
}

/// `[u32 LE vertex-encoded size][codec payload]`, or the bare vertex stream.
fn compress_vertex(
    codec: Option<ByteCodec>,
    level: i32,
    data: &[u8],
    item_count: usize,
    item_stride: usize,
) -> Result<Vec<u8>, SplatPressError> {
    let encoded = vertex_codec::encode(data, item_count, item_stride)?;
    let Some(codec) = codec else {
        return Ok(encoded);
    };

    let payload = codec.compress(level, &encoded)?;
    let mut out = Vec::with_capacity(U32_HEADER_SIZE + payload.len());
    push_u32_le(&mut out, encoded.len())?;
    out.extend_from_slice(&payload);
    Ok(out)
}

fn decompress_vertex(
    codec: Option<ByteCodec>,
    compressed: &[u8],
    item_count: usize,
    item_stride: usize,
    dst: &mut [u8],
) -> Result<(), SplatPressError> {
    let Some(codec) = codec else {
        return vertex_codec::decode(compressed, item_count, item_stride, dst);
    };

    let encoded_len = read_u32_le(compressed, 0).ok_or_else(|| {
        SplatPressError::VertexCodecError("missing encoded-size header".to_string())
    })? as usize;
    let max_len = vertex_codec::encode_bound(item_count, item_stride);
    if encoded_len > max_len {
        return Err(SplatPressError::VertexCodecError(format!(
            "encoded size {} exceeds the bound {} for {} records of {} bytes",
            encoded_len, max_len, item_count, item_stride
        )));
    }

    let mut encoded = vec![0u8; encoded_len];
    codec.decompress(&compressed[U32_HEADER_SIZE..], &mut encoded)?;
    vertex_codec::decode(&encoded, item_count, item_stride, dst)
}

//==================================================================================
// 2. Compressor Implementation
//==================================================================================

impl Compressor for Backend {
    fn name(&self) -> String {
        self.to_string()
    }

    fn levels(&self) -> Vec<i32> {
        match self {
            Backend::Generic { codec } => codec.levels(),
            Backend::VertexAttribute { codec: Some(codec) } => codec.levels(),
            // The bare vertex codec has no tuning knob.
            Backend::VertexAttribute { codec: None } => vec![0],
        }
    }

    fn bound(&self, item_count: usize, item_stride: usize) -> usize {
        let raw = item_count.saturating_mul(item_stride);
        if raw == 0 {
            return 0;
        }
        match self {
            Backend::Generic { codec } => codec.bound(raw),
            Backend::VertexAttribute { codec } => {
                let vertex = vertex_codec::encode_bound(item_count, item_stride);
                match codec {
                    Some(codec) => U32_HEADER_SIZE + codec.bound(vertex),
                    None => vertex,
                }
            }
        }
    }

    fn compress(
        &self,
        level: i32,
        data: &[u8],
        item_count: usize,
        item_stride: usize,
    ) -> Result<Vec<u8>, SplatPressError> {
        check_len(data.len(), item_count, item_stride, "backend input")?;
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let out = match self {
            Backend::Generic { codec } => codec.compress(level, data)?,
            Backend::VertexAttribute { codec } => {
                compress_vertex(*codec, level, data, item_count, item_stride)?
            }
        };

        let bound = self.bound(item_count, item_stride);
        if out.len() > bound {
            return Err(SplatPressError::BoundExceeded {
                backend: self.name(),
                bound,
                actual: out.len(),
            });
        }
        log::trace!(
            "{} level {}: {} -> {} bytes",
            self,
            level,
            data.len(),
            out.len()
        );
        Ok(out)
    }

    fn decompress(
        &self,
        compressed: &[u8],
        item_count: usize,
        item_stride: usize,
        dst: &mut [u8],
    ) -> Result<(), SplatPressError> {
        check_len(dst.len(), item_count, item_stride, "backend output")?;
        if dst.is_empty() {
            if compressed.is_empty() {
                return Ok(());
            }
            return Err(SplatPressError::MalformedChunk {
                offset: 0,
                reason: format!("{} bytes of payload for an empty destination", compressed.len()),
            });
        }

        match self {
            Backend::Generic { codec } => codec.decompress(compressed, dst),
            Backend::VertexAttribute { codec } => {
                decompress_vertex(*codec, compressed, item_count, item_stride, dst)
            }
        }
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
