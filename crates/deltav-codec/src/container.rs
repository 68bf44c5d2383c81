//! Payload framing.
//!
//! Structure (big endian):
//!
//! ```text
//! 4 bytes - magic "DLTV"
//! 1 byte  - version
//! 1 byte  - flags (0)
//! 2 bytes - reserved (0)
//! 4 bytes - width
//! 4 bytes - height
//! 4 bytes - frame count
//! 4 bytes - CRC-32 of the uncompressed anchor + delta stream
//! zlib stream
//! ```
//!
//! Legacy payloads are the bare zlib stream; geometry and frame count travel
//! separately.

use deltav_core::{DeltavError, Result, VideoContext};
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const MAGIC: [u8; 4] = *b"DLTV";
pub const VERSION: u8 = 1;
pub const HEADER_LENGTH: usize = 24;

const MAGIC_RANGE: Range<usize> = 0..4;
const VERSION_OFFSET: usize = 4;
const FLAGS_OFFSET: usize = 5;
const WIDTH_RANGE: Range<usize> = 8..12;
const HEIGHT_RANGE: Range<usize> = 12..16;
const FRAME_COUNT_RANGE: Range<usize> = 16..20;
const CHECKSUM_RANGE: Range<usize> = 20..24;

/// Whether payloads carry a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerFormat {
    /// Header followed by the zlib stream.
    #[default]
    Framed,
    /// Bare zlib stream; geometry and frame count travel out of band.
    Legacy,
}

/// Decoded payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub context: VideoContext,
    pub frame_count: u32,
    pub checksum: u32,
}

fn read_u32(bytes: &[u8], range: Range<usize>) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[range]);
    u32::from_be_bytes(buf)
}

impl Header {
    pub fn new(context: VideoContext, frame_count: u32, checksum: u32) -> Self {
        Self {
            context,
            frame_count,
            checksum,
        }
    }

    /// Serialize to the fixed 24-byte layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LENGTH] {
        let mut out = [0u8; HEADER_LENGTH];
        out[MAGIC_RANGE].copy_from_slice(&MAGIC);
        out[VERSION_OFFSET] = VERSION;
        out[WIDTH_RANGE].copy_from_slice(&self.context.width().to_be_bytes());
        out[HEIGHT_RANGE].copy_from_slice(&self.context.height().to_be_bytes());
        out[FRAME_COUNT_RANGE].copy_from_slice(&self.frame_count.to_be_bytes());
        out[CHECKSUM_RANGE].copy_from_slice(&self.checksum.to_be_bytes());
        out
    }

    /// Parse the header at the start of `payload`, returning it with the
    /// remaining compressed body.
    pub fn parse(payload: &[u8]) -> Result<(Self, &[u8])> {
        if payload.len() < HEADER_LENGTH {
            return Err(DeltavError::Decompression(format!(
                "payload is {} bytes, shorter than the {}-byte header",
                payload.len(),
                HEADER_LENGTH
            )));
        }
        let (head, body) = payload.split_at(HEADER_LENGTH);

        if head[MAGIC_RANGE] != MAGIC {
            return Err(DeltavError::Decompression(
                "missing DLTV magic (legacy payload?)".to_string(),
            ));
        }
        if head[VERSION_OFFSET] != VERSION {
            return Err(DeltavError::Decompression(format!(
                "unsupported container version {}",
                head[VERSION_OFFSET]
            )));
        }
        if head[FLAGS_OFFSET] != 0 {
            return Err(DeltavError::Decompression(format!(
                "unknown header flags {:#04x}",
                head[FLAGS_OFFSET]
            )));
        }

        let context = VideoContext::new(read_u32(head, WIDTH_RANGE), read_u32(head, HEIGHT_RANGE))
            .map_err(|e| DeltavError::Decompression(format!("bad header geometry: {}", e)))?;

        Ok((
            Self {
                context,
                frame_count: read_u32(head, FRAME_COUNT_RANGE),
                checksum: read_u32(head, CHECKSUM_RANGE),
            },
            body,
        ))
    }

    /// Fail with `DimensionMismatch` if the caller's geometry or frame count
    /// disagrees with the header.
    pub fn check_matches(&self, context: &VideoContext, frame_count: u32) -> Result<()> {
        if self.context != *context || self.frame_count != frame_count {
            return Err(DeltavError::DimensionMismatch {
                expected: format!("{} x {} frames", context, frame_count),
                got: format!("{} x {} frames", self.context, self.frame_count),
            });
        }
        Ok(())
    }
}
