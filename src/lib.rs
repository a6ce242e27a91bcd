//! This file is the root of the `splatpress` Rust crate.
//!
//! Its responsibilities are strictly limited to declaring the top-level modules of
//! the library (`kernels`, `backend`, `container`, etc.) and re-exporting the types
//! most callers need.
//!
//! The data flow for one buffer is:
//!
//!   AttributeBuffer -> [byte_delta filter] -> Backend -> ChunkedCodec framing
//!
//! and the reverse on decode.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod backend;
pub mod config;
pub mod container;
pub mod error;
pub mod evaluate;
pub mod kernels;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use backend::{Backend, ByteCodec, Compressor};
pub use config::{BlockSize, CodecConfig, FilterKind};
pub use container::{ChunkedCodec, ContainerMode};
pub use error::SplatPressError;
pub use types::{AttributeBuffer, RecordLayout};

// Used by `log_metric!` expansions in downstream crates.
#[doc(hidden)]
pub use log;
