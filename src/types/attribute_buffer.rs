//! This module defines the canonical view of a splat attribute buffer: a run of
//! fixed-stride records flattened to raw bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SplatPressError;
use crate::utils::{safe_bytes_to_typed_slice, typed_slice_to_bytes};

/// The shape of an attribute buffer. The container format does not persist it,
/// so callers store it next to the compressed bytes and hand it back to decode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    /// Number of records (splats) in the buffer.
    pub vertex_count: usize,
    /// Size of one record in bytes. Every byte offset is one filter channel.
    pub vertex_stride: usize,
}

impl RecordLayout {
    pub fn new(vertex_count: usize, vertex_stride: usize) -> Self {
        Self {
            vertex_count,
            vertex_stride,
        }
    }

    /// Total buffer size in bytes, or an error if it overflows `usize`.
    pub fn byte_len(&self) -> Result<usize, SplatPressError> {
        self.vertex_count
            .checked_mul(self.vertex_stride)
            .ok_or_else(|| {
                SplatPressError::InternalError(format!("record layout {} overflows usize", self))
            })
    }

    /// Validates that `actual` bytes match this layout exactly.
    pub fn check_len(&self, actual: usize, context: &'static str) -> Result<(), SplatPressError> {
        let expected = self.byte_len()?;
        if expected != actual {
            return Err(SplatPressError::LayoutMismatch {
                expected,
                actual,
                context,
            });
        }
        Ok(())
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}B", self.vertex_count, self.vertex_stride)
    }
}

/// A read-only, caller-owned attribute buffer with a validated layout.
///
/// Construction enforces `bytes.len() == vertex_count * vertex_stride`, so every
/// downstream kernel can rely on that invariant without re-checking it.
#[derive(Debug, Clone, Copy)]
pub struct AttributeBuffer<'a> {
    bytes: &'a [u8],
    layout: RecordLayout,
}

impl<'a> AttributeBuffer<'a> {
    pub fn new(bytes: &'a [u8], layout: RecordLayout) -> Result<Self, SplatPressError> {
        if layout.vertex_stride == 0 && layout.vertex_count != 0 {
            return Err(SplatPressError::LayoutMismatch {
                expected: 0,
                actual: bytes.len(),
                context: "zero-stride records",
            });
        }
        layout.check_len(bytes.len(), "attribute buffer")?;
        Ok(Self { bytes, layout })
    }

    /// Builds a buffer from typed records; the stride is `size_of::<T>()`.
    pub fn from_records<T: bytemuck::Pod>(records: &'a [T]) -> Result<Self, SplatPressError> {
        let layout = RecordLayout::new(records.len(), std::mem::size_of::<T>());
        Self::new(typed_slice_to_bytes(records), layout)
    }

    /// Views the buffer as typed records. `T` must be exactly one record wide and
    /// the bytes must be suitably aligned for it.
    pub fn records<T: bytemuck::Pod>(&self) -> Result<&'a [T], SplatPressError> {
        let size = std::mem::size_of::<T>();
        if size != self.layout.vertex_stride {
            return Err(SplatPressError::LayoutMismatch {
                expected: self.layout.vertex_stride,
                actual: size,
                context: "record type size",
            });
        }
        safe_bytes_to_typed_slice(self.bytes)
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.layout.vertex_count
    }

    pub fn vertex_stride(&self) -> usize {
        self.layout.vertex_stride
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
