//! This module defines the core, strongly-typed data representations used
//! throughout the splatpress codec.
//!
//! It currently includes the `RecordLayout` shape descriptor and the borrowed
//! `AttributeBuffer` view that every compression entry point consumes.

pub mod attribute_buffer;

// Re-export the main type(s) for easier access.
pub use attribute_buffer::{AttributeBuffer, RecordLayout};
