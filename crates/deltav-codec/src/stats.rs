//! Size accounting for an encode call.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Sizes at each stage of an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub frame_count: usize,
    /// RGB24 bytes of the whole frames that were encoded.
    pub raw_size: usize,
    /// Planar YUV420 bytes after color conversion.
    pub yuv_size: usize,
    /// Final payload bytes, header included.
    pub compressed_size: usize,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

impl CompressionStats {
    /// YUV size as a percentage of the raw size.
    pub fn yuv_ratio(&self) -> f64 {
        percent(self.yuv_size, self.raw_size)
    }

    /// Payload size as a percentage of the raw size.
    pub fn compression_ratio(&self) -> f64 {
        percent(self.compressed_size, self.raw_size)
    }

    /// Percentage of the raw size saved.
    pub fn space_saving(&self) -> f64 {
        if self.raw_size == 0 {
            return 0.0;
        }
        100.0 - self.compression_ratio()
    }

    pub fn log(&self) {
        info!("Raw size: {} bytes ({} frames)", self.raw_size, self.frame_count);
        info!(
            "YUV420P size: {} bytes ({:.2}% original size)",
            self.yuv_size,
            self.yuv_ratio()
        );
        info!(
            "DEFLATE size: {} bytes ({:.2}% original size)",
            self.compressed_size,
            self.compression_ratio()
        );
    }
}
