// In: src/error.rs

//! This module defines the single, unified error type for the entire splatpress library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Variants fall into three families:
//! * contract violations (caller bugs: wrong layout, malformed framing),
//! * backend failures (a compressor rejected its input),
//! * verification failures (a round trip did not reproduce its input).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplatPressError {
    // =========================================================================
    // === Contract Violations (caller bugs, never retried)
    // =========================================================================
    #[error("Buffer layout mismatch: expected {expected} bytes, got {actual} ({context})")]
    LayoutMismatch {
        expected: usize,
        actual: usize,
        context: &'static str,
    },

    #[error("Channel count {0} exceeds the supported maximum of {1}")]
    TooManyChannels(usize, usize),

    #[error("Malformed chunk stream at offset {offset}: {reason}")]
    MalformedChunk { offset: usize, reason: String },

    // =========================================================================
    // === Backend Failures (propagated from the compressors)
    // =========================================================================
    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    #[error("LZ4 operation failed: {0}")]
    Lz4Error(String),

    #[error("Vertex attribute codec failed: {0}")]
    VertexCodecError(String),

    #[error("Backend '{backend}' produced {actual} bytes, exceeding its bound of {bound}")]
    BoundExceeded {
        backend: String,
        bound: usize,
        actual: usize,
    },

    // =========================================================================
    // === Verification
    // =========================================================================
    #[error("Round trip through '{codec}' at level {level} differs from input at byte {offset}")]
    RoundTripMismatch {
        codec: String,
        level: i32,
        offset: usize,
    },

    // =========================================================================
    // === Plumbing
    // =========================================================================
    #[error("Invalid codec configuration: {0}")]
    Config(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    /// An error from the Serde JSON library, typically while loading a `CodecConfig`.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error
}

impl SplatPressError {
    /// True for errors caused by the caller breaking the codec's contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::LayoutMismatch { .. } | Self::TooManyChannels(..) | Self::MalformedChunk { .. }
        )
    }

    /// True for errors reported by a compressor backend.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::ZstdError(_)
                | Self::Lz4Error(_)
                | Self::VertexCodecError(_)
                | Self::BoundExceeded { .. }
        )
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for SplatPressError {
    fn from(err: bytemuck::PodCastError) -> Self {
        SplatPressError::PodCast(err.to_string())
    }
}
