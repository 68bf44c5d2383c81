//! Deltav Codec - frame sequence compression
//!
//! This crate handles:
//! - Temporal delta prediction between consecutive frames
//! - zlib entropy coding of the frame stream
//! - The optional payload header
//! - Encode/decode orchestration and size statistics

pub mod config;
pub mod container;
pub mod entropy;
pub mod pipeline;
pub mod stats;
pub mod temporal;

pub use config::CodecConfig;
pub use container::{ContainerFormat, Header, HEADER_LENGTH};
pub use entropy::{EntropyBackend, ZlibBackend};
pub use pipeline::{decode_framed, CodecPipeline, DecodedVideo, EncodedVideo};
pub use stats::CompressionStats;
