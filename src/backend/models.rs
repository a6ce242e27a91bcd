//! Defines the closed set of backend compressors and their serializable identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SplatPressError;
use crate::kernels::{lz4, zstd};

//==================================================================================
// 1. Byte-Stream Codecs
//==================================================================================

/// A general-purpose, byte-oriented lossless compressor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ByteCodec {
    Zstd,
    Lz4,
}

impl ByteCodec {
    pub const ALL: [ByteCodec; 2] = [ByteCodec::Zstd, ByteCodec::Lz4];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
        }
    }

    pub fn levels(&self) -> Vec<i32> {
        match self {
            Self::Zstd => zstd::LEVELS.to_vec(),
            Self::Lz4 => lz4::LEVELS.to_vec(),
        }
    }

    pub fn bound(&self, input_len: usize) -> usize {
        match self {
            Self::Zstd => zstd::bound(input_len),
            Self::Lz4 => lz4::bound(input_len),
        }
    }

    pub fn compress(&self, level: i32, input: &[u8]) -> Result<Vec<u8>, SplatPressError> {
        match self {
            Self::Zstd => zstd::compress(input, level),
            Self::Lz4 => lz4::compress(input, level),
        }
    }

    pub fn decompress(&self, input: &[u8], dst: &mut [u8]) -> Result<(), SplatPressError> {
        match self {
            Self::Zstd => zstd::decompress(input, dst),
            Self::Lz4 => lz4::decompress(input, dst),
        }
    }
}

//==================================================================================
// 2. Backends
//==================================================================================

/// A backend the chunked container can drive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// A byte-stream codec applied directly to the (possibly filtered) records.
    Generic { codec: ByteCodec },
    /// The vertex attribute codec, optionally followed by a byte-stream codec.
    VertexAttribute {
        #[serde(default)]
        codec: Option<ByteCodec>,
    },
}

impl Backend {
    pub fn zstd() -> Self {
        Self::Generic {
            codec: ByteCodec::Zstd,
        }
    }

    pub fn lz4() -> Self {
        Self::Generic {
            codec: ByteCodec::Lz4,
        }
    }

    pub fn vertex(codec: Option<ByteCodec>) -> Self {
        Self::VertexAttribute { codec }
    }

    /// Every backend variant, for exhaustive evaluation and tests.
    pub fn all() -> Vec<Backend> {
        let mut all: Vec<Backend> = ByteCodec::ALL
            .iter()
            .map(|&codec| Self::Generic { codec })
            .collect();
        all.push(Self::vertex(None));
        all.extend(ByteCodec::ALL.iter().map(|&codec| Self::vertex(Some(codec))));
        all
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { codec } => write!(f, "{}", codec.name()),
            Self::VertexAttribute { codec: None } => write!(f, "vtx"),
            Self::VertexAttribute { codec: Some(codec) } => write!(f, "vtx-{}", codec.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_are_distinct() {
        let names: Vec<String> = Backend::all().iter().map(|b| b.to_string()).collect();
        assert_eq!(names, vec!["zstd", "lz4", "vtx", "vtx-zstd", "vtx-lz4"]);
    }

    #[test]
    fn test_backend_serde_shape() {
        let json = serde_json::to_string(&Backend::zstd()).unwrap();
        assert_eq!(json, r#"{"kind":"generic","codec":"zstd"}"#);

        let vtx: Backend = serde_json::from_str(r#"{"kind":"vertex_attribute"}"#).unwrap();
        assert_eq!(vtx, Backend::vertex(None));

        let vtx_lz4: Backend =
            serde_json::from_str(r#"{"kind":"vertex_attribute","codec":"lz4"}"#).unwrap();
        assert_eq!(vtx_lz4, Backend::vertex(Some(ByteCodec::Lz4)));
    }

    #[test]
    fn test_codec_levels() {
        assert_eq!(ByteCodec::Zstd.levels(), vec![-5, -1, 1, 5, 9]);
        assert_eq!(ByteCodec::Lz4.levels(), vec![-5, 0, 1, 9]);
    }
}
