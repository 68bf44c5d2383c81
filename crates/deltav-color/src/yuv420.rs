//! Frame-level RGB24 ↔ planar YUV420 conversion.
//!
//! Layout of a YUV420 frame: the full-resolution Y plane, then the U plane,
//! then the V plane, each chroma plane at half width and half height.

use deltav_core::{alloc_buffer, DeltavError, Frame, FrameSequence, FrameStage, Result, VideoContext};
use rayon::prelude::*;
use tracing::debug;

use crate::color_space::{rgb_to_yuv, to_u8, yuv_to_rgb, ChromaSampling};

fn expect_stage(frame: &Frame, stage: FrameStage) -> Result<()> {
    if frame.stage() != stage {
        return Err(DeltavError::InvalidParameter(format!(
            "expected a {} frame, got {}",
            stage.name(),
            frame.stage().name()
        )));
    }
    Ok(())
}

#[inline]
fn pixel(rgb: &[u8], idx: usize) -> [u8; 3] {
    [rgb[idx * 3], rgb[idx * 3 + 1], rgb[idx * 3 + 2]]
}

/// Convert one RGB24 frame to YUV420.
pub fn forward(frame: Frame, ctx: &VideoContext, sampling: ChromaSampling) -> Result<Frame> {
    expect_stage(&frame, FrameStage::Rgb24)?;
    let rgb = frame.into_data();
    if rgb.len() != ctx.frame_size() {
        return Err(DeltavError::size_mismatch(ctx.frame_size(), rgb.len()));
    }

    let width = ctx.width() as usize;
    let height = ctx.height() as usize;
    let chroma_width = ctx.chroma_width();

    let mut yuv = alloc_buffer(ctx.yuv_size())?;
    let (y_plane, chroma) = yuv.split_at_mut(ctx.luma_size());
    let (u_plane, v_plane) = chroma.split_at_mut(ctx.chroma_plane_size());

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let [y, u, v] = rgb_to_yuv(pixel(&rgb, idx));
            y_plane[idx] = to_u8(y);

            if row % 2 != 0 || col % 2 != 0 {
                continue;
            }

            let (u, v) = match sampling {
                ChromaSampling::TopLeft => (u, v),
                ChromaSampling::Average => {
                    // Dimensions are even, so the whole block is in bounds.
                    let mut sum = [u, v];
                    for neighbour in [idx + 1, idx + width, idx + width + 1] {
                        let [_, nu, nv] = rgb_to_yuv(pixel(&rgb, neighbour));
                        sum[0] += nu;
                        sum[1] += nv;
                    }
                    (sum[0] / 4.0, sum[1] / 4.0)
                }
            };

            let c = (row / 2) * chroma_width + col / 2;
            u_plane[c] = to_u8(u);
            v_plane[c] = to_u8(v);
        }
    }

    Frame::new(FrameStage::Yuv420, yuv, ctx)
}

/// Convert one YUV420 frame back to RGB24.
pub fn inverse(frame: Frame, ctx: &VideoContext) -> Result<Frame> {
    expect_stage(&frame, FrameStage::Yuv420)?;
    let yuv = frame.into_data();
    if yuv.len() != ctx.yuv_size() {
        return Err(DeltavError::size_mismatch(ctx.yuv_size(), yuv.len()));
    }

    let width = ctx.width() as usize;
    let height = ctx.height() as usize;
    let chroma_width = ctx.chroma_width();

    let (y_plane, chroma) = yuv.split_at(ctx.luma_size());
    let (u_plane, v_plane) = chroma.split_at(ctx.chroma_plane_size());

    let mut rgb = alloc_buffer(ctx.frame_size())?;
    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let c = (row / 2) * chroma_width + col / 2;
            let out = yuv_to_rgb(y_plane[idx], u_plane[c], v_plane[c]);
            rgb[idx * 3..idx * 3 + 3].copy_from_slice(&out);
        }
    }

    Frame::new(FrameStage::Rgb24, rgb, ctx)
}

/// Convert every frame of an RGB24 sequence, preserving order.
pub fn forward_all(
    seq: FrameSequence,
    sampling: ChromaSampling,
    parallel: bool,
) -> Result<FrameSequence> {
    let ctx = seq.context();
    let frames = seq.into_frames();
    debug!(
        "Converting {} frames to yuv420p ({} chroma, parallel: {})",
        frames.len(),
        sampling.name(),
        parallel
    );

    let converted: Vec<Frame> = if parallel {
        frames
            .into_par_iter()
            .map(|f| forward(f, &ctx, sampling))
            .collect::<Result<Vec<_>>>()?
    } else {
        frames
            .into_iter()
            .map(|f| forward(f, &ctx, sampling))
            .collect::<Result<Vec<_>>>()?
    };

    FrameSequence::from_frames(ctx, converted)
}

/// Convert every frame of a YUV420 sequence back to RGB24, preserving order.
pub fn inverse_all(seq: FrameSequence, parallel: bool) -> Result<FrameSequence> {
    let ctx = seq.context();
    let frames = seq.into_frames();
    debug!("Converting {} frames to rgb24 (parallel: {})", frames.len(), parallel);

    let converted: Vec<Frame> = if parallel {
        frames
            .into_par_iter()
            .map(|f| inverse(f, &ctx))
            .collect::<Result<Vec<_>>>()?
    } else {
        frames
            .into_iter()
            .map(|f| inverse(f, &ctx))
            .collect::<Result<Vec<_>>>()?
    };

    FrameSequence::from_frames(ctx, converted)
}
