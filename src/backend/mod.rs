// In: src/backend/mod.rs

//! The backend compressor layer.
//!
//! Every compressor the container can drive is one variant of the closed `Backend`
//! enum (`models`), and the `Compressor` trait (`traits`) is the single capability
//! interface the container programs against:
//!
//!   [Container] --compress/decompress/bound/levels--> [Backend]
//!        |                                               |
//!        |                        +----------------------+--------------------+
//!        |                        |                                           |
//!        |                 Generic { codec }                 VertexAttribute { codec }
//!        |                        |                                           |
//!        |                 kernels::{zstd, lz4}       kernels::vertex_codec -> [u32 len] -> codec

pub mod models;
pub mod traits;

pub use models::{Backend, ByteCodec};
pub use traits::Compressor;
