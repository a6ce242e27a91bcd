//! A measurement harness: compress and decompress one buffer at every level of a
//! configuration, verify each round trip, and report sizes and timings.

use serde::Serialize;
use std::time::Instant;

use crate::config::CodecConfig;
use crate::container::ChunkedCodec;
use crate::error::SplatPressError;
use crate::types::AttributeBuffer;
use crate::utils::first_difference;

/// Outcome of one level.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LevelResult {
    pub level: i32,
    pub compressed_size: usize,
    pub compress_secs: f64,
    pub decompress_secs: f64,
}

/// Outcome of one configuration over one buffer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub name: String,
    pub raw_size: usize,
    pub levels: Vec<LevelResult>,
}

impl LevelResult {
    /// `raw_size / compressed_size`; an empty output counts as 1.0.
    pub fn ratio(&self, raw_size: usize) -> f64 {
        if self.compressed_size == 0 {
            return 1.0;
        }
        raw_size as f64 / self.compressed_size as f64
    }

    /// Compression throughput in bytes of input per second.
    pub fn compress_throughput(&self, raw_size: usize) -> f64 {
        throughput(raw_size, self.compress_secs)
    }

    /// Decompression throughput in bytes of output per second.
    pub fn decompress_throughput(&self, raw_size: usize) -> f64 {
        throughput(raw_size, self.decompress_secs)
    }
}

impl Evaluation {
    pub fn ratios(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.ratio(self.raw_size)).collect()
    }

    /// The level with the smallest output.
    pub fn best(&self) -> Option<&LevelResult> {
        self.levels.iter().min_by_key(|l| l.compressed_size)
    }
}

fn throughput(bytes: usize, secs: f64) -> f64 {
    if secs <= 0.0 {
        return f64::INFINITY;
    }
    bytes as f64 / secs
}

/// Runs every level of `config` over `buffer`.
///
/// Fails with `RoundTripMismatch` at the first level whose output does not decode
/// back to the input.
pub fn evaluate_config(
    config: &CodecConfig,
    buffer: &AttributeBuffer,
) -> Result<Evaluation, SplatPressError> {
    let codec = ChunkedCodec::new(*config);
    let name = codec.name();
    let raw = buffer.bytes();
    let mut levels = Vec::new();

    for level in codec.levels() {
        let start = Instant::now();
        let compressed = codec.compress(buffer, level)?;
        let compress_secs = start.elapsed().as_secs_f64();

        let mut restored = vec![0u8; raw.len()];
        let start = Instant::now();
        codec.decompress_into(&compressed, buffer.layout(), &mut restored)?;
        let decompress_secs = start.elapsed().as_secs_f64();

        if let Some(offset) = first_difference(raw, &restored) {
            return Err(SplatPressError::RoundTripMismatch {
                codec: name,
                level,
                offset,
            });
        }

        let result = LevelResult {
            level,
            compressed_size: compressed.len(),
            compress_secs,
            decompress_secs,
        };
        log::info!(
            "{} level {}: {} -> {} bytes (ratio {:.3}, {:.1} MB/s in, {:.1} MB/s out)",
            name,
            level,
            raw.len(),
            result.compressed_size,
            result.ratio(raw.len()),
            result.compress_throughput(raw.len()) / 1.0e6,
            result.decompress_throughput(raw.len()) / 1.0e6
        );
        levels.push(result);
    }

    Ok(Evaluation {
        name,
        raw_size: raw.len(),
        levels,
    })
}

/// Runs [`evaluate_config`] for each configuration in turn.
pub fn evaluate_all(
    configs: &[CodecConfig],
    buffer: &AttributeBuffer,
) -> Result<Vec<Evaluation>, SplatPressError> {
    configs.iter().map(|c| evaluate_config(c, buffer)).collect()
}
