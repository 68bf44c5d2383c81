//! The lossless stages must not add error on top of color conversion.

use deltav_codec::{temporal, CodecConfig, CodecPipeline, ContainerFormat, EntropyBackend, ZlibBackend};
use deltav_color::{forward_all, inverse_all, ChromaSampling};
use deltav_core::{FrameSequence, FrameStage, VideoContext};
use proptest::prelude::*;

use crate::support::{context, noise, panning};

/// What a single pass through the lossy stage yields.
fn color_roundtrip(rgb: &[u8], ctx: VideoContext, sampling: ChromaSampling) -> Vec<u8> {
    let seq = FrameSequence::from_rgb_bytes(rgb, ctx).unwrap();
    let yuv = forward_all(seq, sampling, false).unwrap();
    inverse_all(yuv, false).unwrap().into_bytes().unwrap()
}

#[test]
fn decode_matches_single_color_roundtrip() {
    let ctx = context(16, 8);
    let rgb = panning(ctx, 6);

    for container in [ContainerFormat::Framed, ContainerFormat::Legacy] {
        for sampling in [ChromaSampling::TopLeft, ChromaSampling::Average] {
            let config = CodecConfig {
                chroma_sampling: sampling,
                container,
                ..CodecConfig::default()
            };
            let pipeline = CodecPipeline::new(ctx, config).unwrap();
            let encoded = pipeline.encode(&rgb).unwrap();
            let decoded = pipeline.decode(&encoded.payload, encoded.frame_count).unwrap();
            assert_eq!(
                decoded,
                color_roundtrip(&rgb, ctx, sampling),
                "{:?} / {:?}",
                container,
                sampling
            );
        }
    }
}

#[test]
fn yuv_planes_survive_exactly() {
    let ctx = context(8, 8);
    let rgb = noise(ctx.frame_size() * 4, 7);

    let pipeline = CodecPipeline::new(ctx, CodecConfig::legacy()).unwrap();
    let encoded = pipeline.encode(&rgb).unwrap();

    let stream = ZlibBackend::default()
        .decompress(&encoded.payload, 4 * ctx.yuv_size())
        .unwrap();
    let deltas =
        FrameSequence::from_stream(&stream, ctx, FrameStage::DeltaYuv420, 4).unwrap();
    let restored = temporal::inverse(deltas).unwrap();

    let expected = forward_all(
        FrameSequence::from_rgb_bytes(&rgb, ctx).unwrap(),
        ChromaSampling::TopLeft,
        true,
    )
    .unwrap();
    assert_eq!(restored, expected);

    // Luma plane of every frame, byte for byte.
    for (got, want) in restored.frames().iter().zip(expected.frames()) {
        assert_eq!(&got.data()[..ctx.luma_size()], &want.data()[..ctx.luma_size()]);
    }
}

#[test]
fn anchor_is_stored_verbatim() {
    let ctx = context(8, 4);
    let rgb = panning(ctx, 3);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::legacy()).unwrap();
    let encoded = pipeline.encode(&rgb).unwrap();

    let stream = ZlibBackend::default()
        .decompress(&encoded.payload, 3 * ctx.yuv_size())
        .unwrap();
    let anchor = forward_all(
        FrameSequence::from_rgb_bytes(&rgb[..ctx.frame_size()], ctx).unwrap(),
        ChromaSampling::TopLeft,
        false,
    )
    .unwrap();
    assert_eq!(&stream[..ctx.yuv_size()], anchor.frames()[0].data());
}

#[test]
fn parallel_and_sequential_payloads_agree() {
    let ctx = context(16, 16);
    let rgb = panning(ctx, 5);
    let par = CodecPipeline::new(ctx, CodecConfig::default())
        .unwrap()
        .encode(&rgb)
        .unwrap();
    let seq = CodecPipeline::new(
        ctx,
        CodecConfig {
            parallel: false,
            ..CodecConfig::default()
        },
    )
    .unwrap()
    .encode(&rgb)
    .unwrap();
    assert_eq!(par.payload, seq.payload);
}

#[test]
fn black_input_decodes_to_black() {
    let ctx = context(4, 4);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();
    let black = vec![0u8; ctx.frame_size()];
    let encoded = pipeline.encode(&black).unwrap();
    let decoded = pipeline.decode(&encoded.payload, 1).unwrap();
    assert_eq!(decoded, black);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_decode_is_one_color_roundtrip(
        frames in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 24), 1..6),
    ) {
        let ctx = context(4, 2);
        let rgb = frames.concat();
        let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();
        let encoded = pipeline.encode(&rgb).unwrap();
        prop_assert_eq!(encoded.frame_count, frames.len());
        let decoded = pipeline.decode(&encoded.payload, encoded.frame_count).unwrap();
        prop_assert_eq!(decoded, color_roundtrip(&rgb, ctx, ChromaSampling::TopLeft));
    }
}
