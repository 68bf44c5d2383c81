//! Deltav Core - Foundation types for the frame codec
//!
//! This crate provides the types shared by every pipeline stage:
//! - Video geometry (VideoContext)
//! - Stage-tagged frame buffers (Frame, FrameStage)
//! - Ordered frame storage (FrameSequence)
//! - The common error type

pub mod error;
pub mod frame;
pub mod geometry;

pub use error::{DeltavError, Result};
pub use frame::{alloc_buffer, Frame, FrameSequence, FrameStage};
pub use geometry::VideoContext;

/// Defaults carried over from the reference tools.
pub mod defaults {
    /// Default frame width in pixels.
    pub const WIDTH: u32 = 384;

    /// Default frame height in pixels.
    pub const HEIGHT: u32 = 216;
}
