//! Temporal prediction: byte-wise differences between consecutive frames.
//!
//! Deltas wrap modulo 256, so the inverse is exact for every input.

use deltav_core::{alloc_buffer, DeltavError, Frame, FrameSequence, FrameStage, Result};
use rayon::prelude::*;
use tracing::debug;

fn check_stage(frame: &Frame, stage: FrameStage, index: usize) -> Result<()> {
    if frame.stage() != stage {
        return Err(DeltavError::InvalidParameter(format!(
            "frame {} should be {}, got {}",
            index,
            stage.name(),
            frame.stage().name()
        )));
    }
    Ok(())
}

fn delta(prev: &Frame, cur: &Frame) -> Result<Vec<u8>> {
    let mut out = alloc_buffer(cur.len())?;
    for ((o, c), p) in out.iter_mut().zip(cur.data()).zip(prev.data()) {
        *o = c.wrapping_sub(*p);
    }
    Ok(out)
}

/// Replace every frame after the anchor with its difference from the
/// previous frame.
///
/// Deltas are written to fresh buffers and only ever read the untouched
/// input frames, so pairs can be processed in any order.
pub fn forward(seq: FrameSequence, parallel: bool) -> Result<FrameSequence> {
    let ctx = seq.context();
    for (i, frame) in seq.frames().iter().enumerate() {
        check_stage(frame, FrameStage::Yuv420, i)?;
    }

    let deltas: Vec<Vec<u8>> = if parallel {
        seq.frames()
            .par_windows(2)
            .map(|w| delta(&w[0], &w[1]))
            .collect::<Result<Vec<_>>>()?
    } else {
        seq.frames()
            .windows(2)
            .map(|w| delta(&w[0], &w[1]))
            .collect::<Result<Vec<_>>>()?
    };

    let Some(anchor) = seq.into_frames().into_iter().next() else {
        return Ok(FrameSequence::new(ctx));
    };

    let mut out = FrameSequence::new(ctx);
    out.push(anchor)?;
    for data in deltas {
        out.push(Frame::new(FrameStage::DeltaYuv420, data, &ctx)?)?;
    }

    debug!("Computed {} delta frames", out.predicted().len());
    Ok(out)
}

/// Rebuild YUV420 frames from an anchor followed by delta frames.
///
/// Each frame depends on the one before it, so this runs in order.
pub fn inverse(seq: FrameSequence) -> Result<FrameSequence> {
    let ctx = seq.context();
    let mut frames = seq.into_frames().into_iter();

    let Some(anchor) = frames.next() else {
        return Ok(FrameSequence::new(ctx));
    };
    check_stage(&anchor, FrameStage::Yuv420, 0)?;

    let mut out = FrameSequence::new(ctx);
    out.push(anchor)?;

    for (i, frame) in frames.enumerate() {
        check_stage(&frame, FrameStage::DeltaYuv420, i + 1)?;
        let mut data = frame.into_data();
        // `out` is non-empty from here on.
        if let Some(prev) = out.frames().last() {
            for (d, p) in data.iter_mut().zip(prev.data()) {
                *d = d.wrapping_add(*p);
            }
        }
        out.push(Frame::new(FrameStage::Yuv420, data, &ctx)?)?;
    }

    debug!("Reconstructed {} frames from deltas", out.len());
    Ok(out)
}
