//! The chunked container codec: filter + backend, optionally split into
//! record-aligned chunks with a raw fallback for incompressible data.

use crate::backend::Compressor;
use crate::config::{CodecConfig, FilterKind};
use crate::container::framing::{self, FrameReader};
use crate::error::SplatPressError;
use crate::kernels::byte_delta;
use crate::types::{AttributeBuffer, RecordLayout};
use crate::utils::U32_HEADER_SIZE;

/// How a compressed stream was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerMode {
    /// One backend stream for the whole buffer, no framing.
    Whole,
    /// `[u32 size][chunk]` frames, one per block of records.
    Chunked,
    /// `[u32 0][raw bytes]`: chunking did not pay off.
    Fallback,
}

/// A configured, immutable codec. Cheap to share across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedCodec {
    config: CodecConfig,
}

//==================================================================================
// 1. Per-Unit Encode / Decode
//==================================================================================

impl ChunkedCodec {
    /// Filter + backend over one unit (a chunk or the whole buffer).
    fn encode_unit(
        &self,
        data: &[u8],
        count: usize,
        stride: usize,
        level: i32,
    ) -> Result<Vec<u8>, SplatPressError> {
        let backend = &self.config.backend;
        match self.config.filter {
            FilterKind::None => backend.compress(level, data, count, stride),
            FilterKind::ByteDelta => {
                let filtered = byte_delta::encode(data, stride, count)?;
                backend.compress(level, &filtered, count, stride)
            }
        }
    }

    fn decode_unit(
        &self,
        payload: &[u8],
        count: usize,
        stride: usize,
        dst: &mut [u8],
    ) -> Result<(), SplatPressError> {
        let backend = &self.config.backend;
        match self.config.filter {
            FilterKind::None => backend.decompress(payload, count, stride, dst),
            FilterKind::ByteDelta => {
                let mut planar = vec![0u8; dst.len()];
                backend.decompress(payload, count, stride, &mut planar)?;
                byte_delta::unfilter(&planar, dst, stride, count)
            }
        }
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

impl ChunkedCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn name(&self) -> String {
        self.config.name()
    }

    /// Supported levels of the configured backend.
    pub fn levels(&self) -> Vec<i32> {
        self.config.backend.levels()
    }

    /// Bytes per chunk for records of `stride` bytes, or 0 when not chunking.
    ///
    /// The configured size is rounded down to whole records, but never below one
    /// record.
    pub fn block_bytes(&self, stride: usize) -> usize {
        let configured = self.config.block_size.bytes();
        if configured == 0 || stride == 0 {
            return 0;
        }
        (configured / stride).max(1) * stride
    }

    /// Compresses `buffer` at `level`.
    pub fn compress(
        &self,
        buffer: &AttributeBuffer,
        level: i32,
    ) -> Result<Vec<u8>, SplatPressError> {
        let data = buffer.bytes();
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let stride = buffer.vertex_stride();
        let block = self.block_bytes(stride);

        if block == 0 {
            log::debug!("{}: whole-buffer mode for {}", self.name(), buffer.layout());
            return self.encode_unit(data, buffer.vertex_count(), stride, level);
        }

        let mut out = Vec::with_capacity(data.len() + U32_HEADER_SIZE);
        for (index, chunk) in data.chunks(block).enumerate() {
            let payload = self.encode_unit(chunk, chunk.len() / stride, stride, level)?;

            if out.len() + payload.len() > data.len() {
                log::debug!(
                    "{}: chunk {} pushes output past {} bytes, storing raw",
                    self.name(),
                    index,
                    data.len()
                );
                framing::write_fallback(&mut out, data);
                return Ok(out);
            }

            log::trace!("chunk {}: {} -> {} bytes", index, chunk.len(), payload.len());
            log_metric!(
                "event" = "chunk",
                "index" = index,
                "raw" = chunk.len(),
                "compressed" = payload.len()
            );
            framing::write_frame(&mut out, &payload)?;
        }
        Ok(out)
    }

    /// Decompresses into `dst`, which must be exactly `layout.byte_len()` bytes.
    pub fn decompress_into(
        &self,
        compressed: &[u8],
        layout: RecordLayout,
        dst: &mut [u8],
    ) -> Result<(), SplatPressError> {
        layout.check_len(dst.len(), "container destination")?;
        if dst.is_empty() {
            if compressed.is_empty() {
                return Ok(());
            }
            return Err(SplatPressError::MalformedChunk {
                offset: 0,
                reason: format!("{} bytes of stream for an empty layout", compressed.len()),
            });
        }
        let stride = layout.vertex_stride;

        match self.mode_of(compressed) {
            ContainerMode::Whole => self.decode_unit(compressed, layout.vertex_count, stride, dst),
            ContainerMode::Fallback => {
                let raw = &compressed[U32_HEADER_SIZE..];
                if raw.len() != dst.len() {
                    return Err(SplatPressError::MalformedChunk {
                        offset: U32_HEADER_SIZE,
                        reason: format!(
                            "fallback payload is {} bytes, layout {} needs {}",
                            raw.len(),
                            layout,
                            dst.len()
                        ),
                    });
                }
                log::debug!("{}: raw fallback stream", self.name());
                dst.copy_from_slice(raw);
                Ok(())
            }
            ContainerMode::Chunked => self.decode_chunks(compressed, layout, dst),
        }
    }

    /// Owned-buffer convenience over [`ChunkedCodec::decompress_into`].
    pub fn decompress(
        &self,
        compressed: &[u8],
        layout: RecordLayout,
    ) -> Result<Vec<u8>, SplatPressError> {
        let mut out = vec![0u8; layout.byte_len()?];
        self.decompress_into(compressed, layout, &mut out)?;
        Ok(out)
    }

    /// Which mode `compressed` was written in, as far as its header tells.
    pub fn mode_of(&self, compressed: &[u8]) -> ContainerMode {
        if self.config.block_size.bytes() == 0 {
            ContainerMode::Whole
        } else if framing::is_fallback(compressed) {
            ContainerMode::Fallback
        } else {
            ContainerMode::Chunked
        }
    }

    fn decode_chunks(
        &self,
        compressed: &[u8],
        layout: RecordLayout,
        dst: &mut [u8],
    ) -> Result<(), SplatPressError> {
        let stride = layout.vertex_stride;
        let block = self.block_bytes(stride);
        let total = dst.len();
        let mut dst_offset = 0;

        for (index, frame) in FrameReader::new(compressed).enumerate() {
            let frame = frame?;
            if dst_offset >= total {
                return Err(SplatPressError::MalformedChunk {
                    offset: frame.offset,
                    reason: format!("chunk {} is past the last record of {}", index, layout),
                });
            }
            let this_block = block.min(total - dst_offset);
            self.decode_unit(
                frame.payload,
                this_block / stride,
                stride,
                &mut dst[dst_offset..dst_offset + this_block],
            )?;
            log::trace!("chunk {}: {} -> {} bytes", index, frame.payload.len(), this_block);
            dst_offset += this_block;
        }

        if dst_offset != total {
            return Err(SplatPressError::MalformedChunk {
                offset: compressed.len(),
                reason: format!(
                    "stream decodes to {} bytes, layout {} needs {}",
                    dst_offset, layout, total
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::config::BlockSize;

    fn codec(block_size: BlockSize) -> ChunkedCodec {
        ChunkedCodec::new(CodecConfig::new(
            Backend::zstd(),
            FilterKind::ByteDelta,
            block_size,
        ))
    }

    #[test]
    fn test_block_bytes_rounds_to_records() {
        let codec = codec(BlockSize::K64);
        assert_eq!(codec.block_bytes(248), 264 * 248);
        assert_eq!(codec.block_bytes(16), 65_536);
        // A record larger than the block still makes progress.
        assert_eq!(codec.block_bytes(100_000), 100_000);
        assert_eq!(self::codec(BlockSize::None).block_bytes(248), 0);
    }

    #[test]
    fn test_mode_of() {
        assert_eq!(codec(BlockSize::None).mode_of(&[0, 0, 0, 0, 1]), ContainerMode::Whole);
        let chunked = codec(BlockSize::M1);
        assert_eq!(chunked.mode_of(&[0, 0, 0, 0, 1]), ContainerMode::Fallback);
        assert_eq!(chunked.mode_of(&[3, 0, 0, 0, 1]), ContainerMode::Chunked);
        assert_eq!(chunked.mode_of(&[]), ContainerMode::Chunked);
    }

    #[test]
    fn test_codec_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChunkedCodec>();
    }

    #[test]
    fn test_empty_buffer_is_empty_stream() {
        let layout = RecordLayout::new(0, 32);
        let buffer = AttributeBuffer::new(&[], layout).unwrap();
        for block_size in [BlockSize::None, BlockSize::K64] {
            let codec = codec(block_size);
            let compressed = codec.compress(&buffer, 1).unwrap();
            assert!(compressed.is_empty());
            assert!(codec.decompress(&compressed, layout).unwrap().is_empty());
        }
    }

    #[test]
    fn test_destination_size_is_checked() {
        let codec = codec(BlockSize::K64);
        let mut dst = vec![0u8; 10];
        let err = codec
            .decompress_into(&[1, 0, 0, 0, 0], RecordLayout::new(3, 4), &mut dst)
            .unwrap_err();
        assert!(matches!(err, SplatPressError::LayoutMismatch { .. }));
    }
}
