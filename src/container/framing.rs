//! Byte-level framing of the chunked container.
//!
//! Chunked: `([u32 LE size][size bytes])*`
//! Fallback: `[u32 == 0][original bytes]`

use crate::error::SplatPressError;
use crate::utils::{push_u32_le, read_u32_le, U32_HEADER_SIZE};

/// The size header that marks a fallback stream.
pub const FALLBACK_MARKER: u32 = 0;

/// Appends one `[u32 LE len][payload]` frame.
pub fn write_frame(out: &mut Vec<u8>, payload: &[u8]) -> Result<(), SplatPressError> {
    if payload.is_empty() {
        return Err(SplatPressError::InternalError(
            "a zero-length chunk would be read back as the fallback marker".to_string(),
        ));
    }
    push_u32_le(out, payload.len())?;
    out.extend_from_slice(payload);
    Ok(())
}

/// Replaces everything in `out` with the fallback encoding of `raw`.
pub fn write_fallback(out: &mut Vec<u8>, raw: &[u8]) {
    out.clear();
    out.reserve(U32_HEADER_SIZE + raw.len());
    out.extend_from_slice(&FALLBACK_MARKER.to_le_bytes());
    out.extend_from_slice(raw);
}

/// True if the stream starts with the fallback marker.
pub fn is_fallback(stream: &[u8]) -> bool {
    read_u32_le(stream, 0) == Some(FALLBACK_MARKER)
}

/// One chunk payload and the stream offset of its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub offset: usize,
    pub payload: &'a [u8],
}

/// Walks the frames of a chunked stream, validating every header.
pub struct FrameReader<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self { stream, pos: 0 }
    }

    fn read_frame(&mut self) -> Result<Frame<'a>, SplatPressError> {
        let offset = self.pos;
        let len = read_u32_le(self.stream, offset).ok_or_else(|| SplatPressError::MalformedChunk {
            offset,
            reason: format!(
                "truncated header: {} bytes left, need {}",
                self.stream.len() - offset,
                U32_HEADER_SIZE
            ),
        })? as usize;
        if len == FALLBACK_MARKER as usize {
            return Err(SplatPressError::MalformedChunk {
                offset,
                reason: "zero-length chunk inside a chunked stream".to_string(),
            });
        }

        let start = offset + U32_HEADER_SIZE;
        let remaining = self.stream.len() - start;
        if len > remaining {
            return Err(SplatPressError::MalformedChunk {
                offset,
                reason: format!("declared length {} exceeds the {} bytes left", len, remaining),
            });
        }
        self.pos = start + len;
        Ok(Frame {
            offset,
            payload: &self.stream[start..start + len],
        })
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<Frame<'a>, SplatPressError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.stream.len() {
            return None;
        }
        let frame = self.read_frame();
        if frame.is_err() {
            // Stop after the first error.
            self.pos = self.stream.len();
        }
        Some(frame)
    }
}
