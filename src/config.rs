// In: src/config.rs

//! The single source of truth for codec configuration.
//!
//! A `CodecConfig` picks a backend compressor, an optional byte-delta filter and a
//! block size for the chunked container. It is created once at the application
//! boundary (usually from JSON) and handed to `ChunkedCodec::new`, which never
//! mutates it.

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, ByteCodec};
use crate::error::SplatPressError;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// The reversible filter applied before the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Records are handed to the backend untouched.
    None,
    /// **Default:** Per-channel byte deltas in planar layout.
    #[default]
    ByteDelta,
}

/// The configured chunk size of the container, before rounding to whole records.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockSize {
    /// **Default:** The whole buffer is one unit, with no chunk framing.
    #[default]
    None,
    K64,
    K256,
    M1,
    M4,
    M16,
    M64,
}

impl BlockSize {
    pub const ALL: [BlockSize; 7] = [
        BlockSize::None,
        BlockSize::K64,
        BlockSize::K256,
        BlockSize::M1,
        BlockSize::M4,
        BlockSize::M16,
        BlockSize::M64,
    ];

    /// The configured size in bytes. Zero means "not chunked".
    pub fn bytes(&self) -> usize {
        const KIB: usize = 1024;
        const MIB: usize = 1024 * KIB;
        match self {
            Self::None => 0,
            Self::K64 => 64 * KIB,
            Self::K256 => 256 * KIB,
            Self::M1 => MIB,
            Self::M4 => 4 * MIB,
            Self::M16 => 16 * MIB,
            Self::M64 => 64 * MIB,
        }
    }

    /// The suffix this block size contributes to a configuration name.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::K64 => "-64k",
            Self::K256 => "-256k",
            Self::M1 => "-1M",
            Self::M4 => "-4M",
            Self::M16 => "-16M",
            Self::M64 => "-64M",
        }
    }
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// The backend compressor.
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// The filter run before the backend.
    #[serde(default)]
    pub filter: FilterKind,

    /// The chunk size of the container.
    #[serde(default)]
    pub block_size: BlockSize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            filter: FilterKind::default(),
            block_size: BlockSize::default(),
        }
    }
}

/// Helper for `serde` to default the backend to zstd.
fn default_backend() -> Backend {
    Backend::zstd()
}

impl CodecConfig {
    pub fn new(backend: Backend, filter: FilterKind, block_size: BlockSize) -> Self {
        Self {
            backend,
            filter,
            block_size,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SplatPressError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, SplatPressError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Display name: backend, then `-bd` when filtered, then the block suffix
    /// (e.g. `zstd-bd-1M`).
    pub fn name(&self) -> String {
        let filter = match self.filter {
            FilterKind::None => "",
            FilterKind::ByteDelta => "-bd",
        };
        format!("{}{}{}", self.backend, filter, self.block_size.suffix())
    }

    /// Parses a name produced by [`CodecConfig::name`].
    pub fn from_name(name: &str) -> Result<Self, SplatPressError> {
        Backend::all()
            .into_iter()
            .flat_map(|backend| {
                [FilterKind::None, FilterKind::ByteDelta].into_iter().flat_map(move |filter| {
                    BlockSize::ALL
                        .into_iter()
                        .map(move |block_size| Self::new(backend, filter, block_size))
                })
            })
            .find(|config| config.name() == name)
            .ok_or_else(|| {
                SplatPressError::Config(format!("unknown codec configuration '{}'", name))
            })
    }

    /// The standard set of configurations worth comparing on splat data.
    pub fn presets() -> Vec<CodecConfig> {
        use BlockSize as B;
        use FilterKind as F;
        vec![
            Self::new(Backend::zstd(), F::ByteDelta, B::M1),
            Self::new(Backend::lz4(), F::ByteDelta, B::M1),
            Self::new(Backend::zstd(), F::ByteDelta, B::None),
            Self::new(Backend::lz4(), F::ByteDelta, B::None),
            Self::new(Backend::zstd(), F::None, B::None),
            Self::new(Backend::lz4(), F::None, B::None),
            Self::new(Backend::vertex(Some(ByteCodec::Zstd)), F::None, B::None),
            Self::new(Backend::vertex(Some(ByteCodec::Lz4)), F::None, B::None),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_backend_filter_block_order() {
        let names: Vec<String> = CodecConfig::presets().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "zstd-bd-1M",
                "lz4-bd-1M",
                "zstd-bd",
                "lz4-bd",
                "zstd",
                "lz4",
                "vtx-zstd",
                "vtx-lz4"
            ]
        );
        let cfg = CodecConfig::new(Backend::vertex(None), FilterKind::ByteDelta, BlockSize::K64);
        assert_eq!(cfg.name(), "vtx-bd-64k");
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(BlockSize::None.bytes(), 0);
        assert_eq!(BlockSize::K64.bytes(), 65_536);
        assert_eq!(BlockSize::M1.bytes(), 1 << 20);
        assert_eq!(BlockSize::M64.bytes(), 64 << 20);
        let suffixes: Vec<&str> = BlockSize::ALL.iter().map(|b| b.suffix()).collect();
        assert_eq!(suffixes, vec!["", "-64k", "-256k", "-1M", "-4M", "-16M", "-64M"]);
    }

    #[test]
    fn test_json_defaults_and_roundtrip() {
        let cfg = CodecConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, CodecConfig::default());
        assert_eq!(cfg.name(), "zstd-bd");

        let json = r#"{
            "backend": {"kind": "vertex_attribute", "codec": null},
            "filter": "none",
            "block_size": "k256"
        }"#;
        let cfg = CodecConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.backend, Backend::vertex(None));
        assert_eq!(cfg.block_size, BlockSize::K256);

        let restored = CodecConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_eq!(restored, cfg);
    }

    #[test]
    fn test_from_name_inverts_name() {
        for config in CodecConfig::presets() {
            assert_eq!(CodecConfig::from_name(&config.name()).unwrap(), config);
        }
        let cfg = CodecConfig::from_name("vtx-lz4-bd-16M").unwrap();
        assert_eq!(cfg.block_size, BlockSize::M16);
        assert!(matches!(
            CodecConfig::from_name("zstd-xx"),
            Err(SplatPressError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        let err = CodecConfig::from_json_str(r#"{"block_size": "m2"}"#).unwrap_err();
        assert!(matches!(err, SplatPressError::SerdeJson(_)));
    }
}
