//! Frame buffers and ordered frame storage.
//!
//! Every transform consumes the frames it is given and hands back freshly
//! owned buffers, so a frame is only ever held by one stage at a time.

use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use tracing::{debug, warn};

use crate::error::{DeltavError, Result};
use crate::geometry::VideoContext;

/// What the bytes of a frame currently represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameStage {
    /// Packed 8-bit R, G, B per pixel, row-major.
    Rgb24,
    /// Planar Y, then U, then V with 4:2:0 chroma.
    Yuv420,
    /// Byte-wise difference of two consecutive YUV420 frames.
    DeltaYuv420,
}

impl FrameStage {
    /// Size in bytes of one frame at this stage.
    pub fn byte_len(self, ctx: &VideoContext) -> usize {
        match self {
            Self::Rgb24 => ctx.frame_size(),
            Self::Yuv420 | Self::DeltaYuv420 => ctx.yuv_size(),
        }
    }

    /// Stage carried by the anchor of a sequence whose other frames are at
    /// this stage. The anchor is never delta-encoded.
    pub fn anchor_stage(self) -> Self {
        match self {
            Self::DeltaYuv420 => Self::Yuv420,
            other => other,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rgb24 => "rgb24",
            Self::Yuv420 => "yuv420p",
            Self::DeltaYuv420 => "delta-yuv420p",
        }
    }
}

/// Allocate a zeroed buffer, reporting allocation failure instead of aborting.
pub fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// A single frame tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    stage: FrameStage,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a buffer, checking its length against the context.
    pub fn new(stage: FrameStage, data: Vec<u8>, ctx: &VideoContext) -> Result<Self> {
        let expected = stage.byte_len(ctx);
        if data.len() != expected {
            return Err(DeltavError::size_mismatch(expected, data.len()));
        }
        Ok(Self { stage, data })
    }

    /// Stage of this frame.
    #[inline]
    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    /// Frame bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Give up the frame and keep its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// An ordered list of frames sharing one context.
///
/// Index 0 is the anchor frame; the rest are predicted frames once the
/// sequence has been through temporal prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    context: VideoContext,
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Create an empty sequence.
    pub fn new(context: VideoContext) -> Self {
        Self {
            context,
            frames: Vec::new(),
        }
    }

    /// Build a sequence from frames that were already validated against
    /// `context`.
    pub fn from_frames(context: VideoContext, frames: Vec<Frame>) -> Result<Self> {
        let mut seq = Self::new(context);
        seq.frames.try_reserve_exact(frames.len())?;
        for frame in frames {
            seq.push(frame)?;
        }
        Ok(seq)
    }

    /// Split packed RGB24 bytes into frames.
    ///
    /// A trailing chunk shorter than one frame is dropped.
    pub fn from_rgb_bytes(bytes: &[u8], context: VideoContext) -> Result<Self> {
        let frame_size = context.frame_size();
        let chunks = bytes.chunks_exact(frame_size);
        let remainder = chunks.remainder().len();

        let mut seq = Self::new(context);
        seq.frames.try_reserve_exact(bytes.len() / frame_size)?;
        for chunk in chunks {
            let mut data = Vec::new();
            data.try_reserve_exact(frame_size)?;
            data.extend_from_slice(chunk);
            seq.frames.push(Frame {
                stage: FrameStage::Rgb24,
                data,
            });
        }

        if remainder > 0 {
            warn!(
                "Dropping {} trailing bytes (less than one {} frame)",
                remainder, context
            );
        }
        debug!("Split {} bytes into {} frames", bytes.len(), seq.len());
        Ok(seq)
    }

    /// Read packed RGB24 frames until the reader is exhausted.
    ///
    /// A trailing partial frame is dropped, as in [`Self::from_rgb_bytes`].
    pub fn read_rgb<R: Read>(mut reader: R, context: VideoContext) -> Result<Self> {
        let frame_size = context.frame_size();
        let mut seq = Self::new(context);

        loop {
            let mut data = alloc_buffer(frame_size)?;
            let filled = read_full(&mut reader, &mut data)?;
            if filled == frame_size {
                seq.frames.try_reserve(1)?;
                seq.frames.push(Frame {
                    stage: FrameStage::Rgb24,
                    data,
                });
                continue;
            }
            if filled > 0 {
                warn!(
                    "Dropping {} trailing bytes (less than one {} frame)",
                    filled, context
                );
            }
            break;
        }

        debug!("Read {} frames from input", seq.len());
        Ok(seq)
    }

    /// Split a decompressed stream into `frame_count` frames.
    ///
    /// Predicted frames get `stage`; the anchor gets `stage.anchor_stage()`.
    pub fn from_stream(
        bytes: &[u8],
        context: VideoContext,
        stage: FrameStage,
        frame_count: usize,
    ) -> Result<Self> {
        let size = stage.byte_len(&context);
        let expected = size.checked_mul(frame_count).ok_or_else(|| {
            DeltavError::InvalidParameter(format!("{} frames overflow the stream size", frame_count))
        })?;
        if bytes.len() != expected {
            return Err(DeltavError::size_mismatch(expected, bytes.len()));
        }

        let mut seq = Self::new(context);
        seq.frames.try_reserve_exact(frame_count)?;
        for (i, chunk) in bytes.chunks_exact(size).enumerate() {
            let mut data = Vec::new();
            data.try_reserve_exact(size)?;
            data.extend_from_slice(chunk);
            let stage = if i == 0 { stage.anchor_stage() } else { stage };
            seq.frames.push(Frame { stage, data });
        }
        Ok(seq)
    }

    /// Append a frame, checking its length against the context.
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        let expected = frame.stage.byte_len(&self.context);
        if frame.len() != expected {
            return Err(DeltavError::size_mismatch(expected, frame.len()));
        }
        self.frames.try_reserve(1)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Shared geometry.
    #[inline]
    pub fn context(&self) -> VideoContext {
        self.context
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The anchor frame, if any.
    pub fn anchor(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Frames after the anchor.
    pub fn predicted(&self) -> &[Frame] {
        self.frames.get(1..).unwrap_or(&[])
    }

    /// Frame bytes in anchor-then-predicted order.
    pub fn chunks(&self) -> Vec<&[u8]> {
        self.frames.iter().map(Frame::data).collect()
    }

    /// Total bytes held by all frames.
    pub fn total_bytes(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// Give up the sequence and keep its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Concatenate every frame into one buffer.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.total_bytes())?;
        for frame in self.frames {
            out.extend_from_slice(&frame.data);
        }
        Ok(out)
    }
}

/// Fill `buf` from `reader`, returning how many bytes were read before EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
