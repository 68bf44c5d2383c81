//! Video geometry shared by every frame in a session.

use serde::{Deserialize, Serialize};

use crate::error::{DeltavError, Result};

/// Width and height of the video, plus the buffer sizes derived from them.
///
/// Both dimensions must be positive and even, so every 2x2 chroma block is
/// complete and chroma plane indexing can never leave the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawContext")]
pub struct VideoContext {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawContext {
    width: u32,
    height: u32,
}

impl TryFrom<RawContext> for VideoContext {
    type Error = DeltavError;

    fn try_from(raw: RawContext) -> Result<Self> {
        Self::new(raw.width, raw.height)
    }
}

impl VideoContext {
    /// Create a context, rejecting zero or odd dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DeltavError::InvalidParameter(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(DeltavError::InvalidParameter(format!(
                "4:2:0 subsampling needs even dimensions, got {}x{}",
                width, height
            )));
        }
        // frame_size is the largest derived size; make sure it fits.
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| {
                DeltavError::InvalidParameter(format!("{}x{} overflows a frame buffer", width, height))
            })?;

        Ok(Self { width, height })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in one frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in one RGB24 frame.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.pixel_count() * 3
    }

    /// Bytes in the Y plane.
    #[inline]
    pub fn luma_size(&self) -> usize {
        self.pixel_count()
    }

    /// Bytes in each of the U and V planes.
    #[inline]
    pub fn chroma_plane_size(&self) -> usize {
        self.pixel_count() / 4
    }

    /// Width of a chroma plane in samples.
    #[inline]
    pub fn chroma_width(&self) -> usize {
        self.width as usize / 2
    }

    /// Bytes in one planar YUV420 frame.
    #[inline]
    pub fn yuv_size(&self) -> usize {
        self.pixel_count() + self.pixel_count() / 2
    }
}

impl std::fmt::Display for VideoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
