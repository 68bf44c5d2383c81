//! End-to-end behavior on crafted inputs and damaged payloads.

use deltav_codec::{
    decode_framed, temporal, CodecConfig, CodecPipeline, EntropyBackend, Header, ZlibBackend,
    HEADER_LENGTH,
};
use deltav_color::{forward_all, ChromaSampling};
use deltav_core::{DeltavError, FrameSequence, VideoContext};
use std::time::{Duration, Instant};

use crate::support::{context, noise, panning, repeated};

// ── Scenario A: identical frames ───────────────────────────────

#[test]
fn solid_red_frames_produce_zero_delta() {
    let ctx = context(2, 2);
    let red = repeated(&[255, 0, 0], 4);
    let rgb = repeated(&red, 2);

    let yuv = forward_all(
        FrameSequence::from_rgb_bytes(&rgb, ctx).unwrap(),
        ChromaSampling::TopLeft,
        false,
    )
    .unwrap();
    assert_eq!(yuv.frames()[0], yuv.frames()[1]);
    assert_eq!(yuv.frames()[0].data(), &[76, 76, 76, 76, 84, 255]);

    let deltas = temporal::forward(yuv, false).unwrap();
    assert_eq!(deltas.predicted()[0].data(), &[0; 6]);
}

#[test]
fn repeated_frame_costs_almost_nothing() {
    let ctx = context(2, 2);
    let red = repeated(&[255, 0, 0], 4);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::legacy()).unwrap();

    let one = pipeline.encode(&red).unwrap();
    let two = pipeline.encode(&repeated(&red, 2)).unwrap();
    assert_eq!(two.frame_count, 2);
    assert!(
        two.payload.len() <= one.payload.len() + 8,
        "{} vs {}",
        two.payload.len(),
        one.payload.len()
    );
}

#[test]
fn low_motion_compresses_sublinearly() {
    let ctx = context(64, 64);
    let anchor = noise(ctx.frame_size(), 42);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();

    let single = pipeline.encode(&anchor).unwrap().payload.len();
    let twenty = pipeline.encode(&repeated(&anchor, 20)).unwrap().payload.len();

    let marginal = (twenty - single) / 19;
    assert!(marginal < 64, "each repeated frame cost {} bytes", marginal);
    assert!(twenty < single * 2);
}

#[test]
fn moving_content_still_shrinks() {
    let ctx = context(32, 32);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();
    let encoded = pipeline.encode(&panning(ctx, 10)).unwrap();
    assert!(encoded.stats.compression_ratio() < encoded.stats.yuv_ratio());
    assert!((encoded.stats.yuv_ratio() - 50.0).abs() < 1e-9);
}

// ── Scenario B: damaged payloads ───────────────────────────────

fn encoded(config: CodecConfig) -> (CodecPipeline, Vec<u8>) {
    let ctx = context(32, 16);
    let pipeline = CodecPipeline::new(ctx, config).unwrap();
    let payload = pipeline.encode(&noise(ctx.frame_size() * 3, 9)).unwrap().payload;
    (pipeline, payload)
}

#[test]
fn truncated_legacy_payload_fails() {
    let (pipeline, payload) = encoded(CodecConfig::legacy());
    let err = pipeline.decode(&payload[..payload.len() / 2], 3).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
}

#[test]
fn truncated_framed_payload_fails() {
    let (pipeline, payload) = encoded(CodecConfig::default());
    let cut = HEADER_LENGTH + (payload.len() - HEADER_LENGTH) / 2;
    let err = pipeline.decode(&payload[..cut], 3).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);

    let err = pipeline.decode(&payload[..10], 3).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
}

#[test]
fn checksum_mismatch_fails() {
    let (pipeline, mut payload) = encoded(CodecConfig::default());
    payload[HEADER_LENGTH - 1] ^= 0xff;
    let err = pipeline.decode(&payload, 3).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
}

#[test]
fn damaged_zlib_trailer_fails() {
    let (pipeline, mut payload) = encoded(CodecConfig::legacy());
    let last = payload.len() - 1;
    payload[last] ^= 0x01;
    let err = pipeline.decode(&payload, 3).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
}

#[test]
fn damaged_body_never_decodes_silently() {
    let (pipeline, mut payload) = encoded(CodecConfig::default());
    let mid = HEADER_LENGTH + (payload.len() - HEADER_LENGTH) / 2;
    payload[mid] ^= 0x5a;
    assert!(pipeline.decode(&payload, 3).is_err());
}

#[test]
fn huge_header_frame_count_fails_fast() {
    let ctx = context(2, 2);
    let mut payload = Header::new(ctx, 400_000_000, 0).to_bytes().to_vec();
    payload.extend(ZlibBackend::default().compress(&[&[0; 6]]).unwrap());

    let started = Instant::now();
    let err = decode_framed(&payload, CodecConfig::default()).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn appended_bytes_are_rejected() {
    for config in [CodecConfig::default(), CodecConfig::legacy()] {
        let (pipeline, mut payload) = encoded(config);
        payload.extend_from_slice(b"appended after the stream");
        let err = pipeline.decode(&payload, 3).unwrap_err();
        assert!(
            matches!(err, DeltavError::Decompression(_)),
            "{:?}: {}",
            config.container,
            err
        );
    }
}

#[test]
fn frame_count_too_large_fails() {
    let (pipeline, payload) = encoded(CodecConfig::legacy());
    let err = pipeline.decode(&payload, 4).unwrap_err();
    assert!(matches!(err, DeltavError::Decompression(_)), "{}", err);
}

#[test]
fn frame_count_too_small_is_mismatch() {
    let (pipeline, payload) = encoded(CodecConfig::legacy());
    let err = pipeline.decode(&payload, 2).unwrap_err();
    assert!(matches!(err, DeltavError::DimensionMismatch { .. }), "{}", err);
}

#[test]
fn framed_header_mismatch_is_reported() {
    let (_, payload) = encoded(CodecConfig::default());

    let wrong_count = CodecPipeline::new(context(32, 16), CodecConfig::default()).unwrap();
    assert!(matches!(
        wrong_count.decode(&payload, 2),
        Err(DeltavError::DimensionMismatch { .. })
    ));

    // Same pixel count, transposed geometry.
    let transposed = CodecPipeline::new(context(16, 32), CodecConfig::default()).unwrap();
    assert!(matches!(
        transposed.decode(&payload, 3),
        Err(DeltavError::DimensionMismatch { .. })
    ));

    let decoded = decode_framed(&payload, CodecConfig::default()).unwrap();
    assert_eq!(decoded.context, context(32, 16));
    assert_eq!(decoded.frame_count, 3);
}

#[test]
fn legacy_payload_is_not_mistaken_for_framed() {
    let (_, payload) = encoded(CodecConfig::legacy());
    let framed = CodecPipeline::new(context(32, 16), CodecConfig::default()).unwrap();
    assert!(matches!(
        framed.decode(&payload, 3),
        Err(DeltavError::Decompression(_))
    ));
}

#[test]
fn legacy_stream_is_plain_zlib() {
    let (pipeline, payload) = encoded(CodecConfig::legacy());
    let ctx = pipeline.context();
    let stream = ZlibBackend::default()
        .decompress(&payload, 3 * ctx.yuv_size())
        .unwrap();
    assert_eq!(stream.len(), 3 * ctx.yuv_size());
}

// ── Scenario C: odd geometry ───────────────────────────────────

#[test]
fn odd_dimensions_are_rejected() {
    for (w, h) in [(3, 2), (2, 3), (5, 7), (1, 1)] {
        assert!(matches!(
            VideoContext::new(w, h),
            Err(DeltavError::InvalidParameter(_))
        ));
    }
}

#[test]
fn smallest_even_frame_roundtrips() {
    let ctx = context(2, 2);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();
    let rgb = noise(ctx.frame_size() * 5, 3);
    let encoded = pipeline.encode(&rgb).unwrap();
    let decoded = pipeline.decode(&encoded.payload, 5).unwrap();
    assert_eq!(decoded.len(), rgb.len());
}

#[test]
fn trailing_partial_frame_is_dropped() {
    let ctx = context(4, 4);
    let pipeline = CodecPipeline::new(ctx, CodecConfig::default()).unwrap();
    let mut rgb = panning(ctx, 2);
    rgb.extend_from_slice(&[1, 2, 3, 4, 5]);
    let encoded = pipeline.encode(&rgb).unwrap();
    assert_eq!(encoded.frame_count, 2);
    assert_eq!(encoded.stats.raw_size, 2 * ctx.frame_size());
}
