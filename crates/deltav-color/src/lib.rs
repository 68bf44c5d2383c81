//! Deltav Color - RGB24 ↔ planar YUV420 conversion.

pub mod color_space;
pub mod yuv420;

pub use color_space::{rgb_to_yuv, yuv_to_rgb, ChromaSampling};
pub use yuv420::{forward, forward_all, inverse, inverse_all};
