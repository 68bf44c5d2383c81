//! Encode and decode orchestration.
//!
//! Encode: RGB24 frames → YUV420 → deltas → zlib (→ header).
//! Decode runs the same stages backwards. Any stage failure aborts the call.

use deltav_color as color;
use deltav_core::{DeltavError, FrameSequence, FrameStage, Result, VideoContext};
use flate2::Crc;
use std::io::Read;
use tracing::{debug, info};

use crate::config::CodecConfig;
use crate::container::{ContainerFormat, Header};
use crate::entropy::{EntropyBackend, ZlibBackend};
use crate::stats::CompressionStats;
use crate::temporal;

/// Result of an encode call.
///
/// `frame_count` must travel with a legacy payload; framed payloads also
/// carry it in the header.
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub payload: Vec<u8>,
    pub frame_count: usize,
    pub stats: CompressionStats,
}

/// Result of decoding a framed payload without caller-supplied geometry.
#[derive(Debug, Clone)]
pub struct DecodedVideo {
    pub context: VideoContext,
    pub frame_count: usize,
    /// Packed RGB24 frames.
    pub rgb: Vec<u8>,
}

/// The four-stage codec bound to one geometry.
pub struct CodecPipeline {
    context: VideoContext,
    config: CodecConfig,
    backend: Box<dyn EntropyBackend>,
}

impl CodecPipeline {
    /// Create a pipeline using the zlib backend at the configured level.
    pub fn new(context: VideoContext, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        let backend = ZlibBackend::new(config.compression_level)?;
        Ok(Self::with_backend(context, config, Box::new(backend)))
    }

    /// Create a pipeline with a custom entropy backend.
    pub fn with_backend(
        context: VideoContext,
        config: CodecConfig,
        backend: Box<dyn EntropyBackend>,
    ) -> Self {
        Self {
            context,
            config,
            backend,
        }
    }

    pub fn context(&self) -> VideoContext {
        self.context
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode packed RGB24 bytes. A trailing partial frame is dropped.
    pub fn encode(&self, rgb: &[u8]) -> Result<EncodedVideo> {
        let seq = FrameSequence::from_rgb_bytes(rgb, self.context)?;
        self.encode_sequence(seq)
    }

    /// Encode RGB24 frames read from `reader` until it is exhausted.
    pub fn encode_reader<R: Read>(&self, reader: R) -> Result<EncodedVideo> {
        let seq = FrameSequence::read_rgb(reader, self.context)?;
        self.encode_sequence(seq)
    }

    /// Encode an RGB24 frame sequence.
    pub fn encode_sequence(&self, seq: FrameSequence) -> Result<EncodedVideo> {
        if seq.context() != self.context {
            return Err(DeltavError::DimensionMismatch {
                expected: self.context.to_string(),
                got: seq.context().to_string(),
            });
        }

        let frame_count = seq.len();
        let header_count = u32::try_from(frame_count).map_err(|_| {
            DeltavError::InvalidParameter(format!("{} frames exceed the u32 frame count", frame_count))
        })?;
        let raw_size = seq.total_bytes();
        info!(
            "Encoding {} frames at {} with {}",
            frame_count,
            self.context,
            self.backend.name()
        );

        let yuv = color::forward_all(seq, self.config.chroma_sampling, self.config.parallel)?;
        let yuv_size = yuv.total_bytes();

        let deltas = temporal::forward(yuv, self.config.parallel)?;
        let chunks = deltas.chunks();
        let compressed = self.backend.compress(&chunks)?;

        let payload = match self.config.container {
            ContainerFormat::Legacy => compressed,
            ContainerFormat::Framed => {
                let mut crc = Crc::new();
                for chunk in &chunks {
                    crc.update(chunk);
                }
                let header = Header::new(self.context, header_count, crc.sum()).to_bytes();

                let mut payload = Vec::new();
                payload.try_reserve_exact(header.len() + compressed.len())?;
                payload.extend_from_slice(&header);
                payload.extend_from_slice(&compressed);
                payload
            }
        };

        let stats = CompressionStats {
            frame_count,
            raw_size,
            yuv_size,
            compressed_size: payload.len(),
        };
        stats.log();

        Ok(EncodedVideo {
            payload,
            frame_count,
            stats,
        })
    }

    /// Decode a payload into packed RGB24 bytes.
    ///
    /// The output is exactly `frame_count * frame_size` bytes. Framed payloads
    /// are checked against the caller's geometry and frame count.
    pub fn decode(&self, payload: &[u8], frame_count: usize) -> Result<Vec<u8>> {
        self.decode_sequence(payload, frame_count)?.into_bytes()
    }

    /// Decode a payload into RGB24 frames.
    pub fn decode_sequence(&self, payload: &[u8], frame_count: usize) -> Result<FrameSequence> {
        match self.config.container {
            ContainerFormat::Legacy => self.decode_body(payload, frame_count, None),
            ContainerFormat::Framed => {
                let (header, body) = Header::parse(payload)?;
                let count = u32::try_from(frame_count).unwrap_or(u32::MAX);
                header.check_matches(&self.context, count)?;
                self.decode_body(body, frame_count, Some(header.checksum))
            }
        }
    }

    fn decode_body(
        &self,
        body: &[u8],
        frame_count: usize,
        checksum: Option<u32>,
    ) -> Result<FrameSequence> {
        let expected = self
            .context
            .yuv_size()
            .checked_mul(frame_count)
            .ok_or_else(|| {
                DeltavError::InvalidParameter(format!("{} frames overflow the stream size", frame_count))
            })?;
        info!(
            "Decoding {} frames at {} ({} compressed bytes)",
            frame_count,
            self.context,
            body.len()
        );

        let stream = self.backend.decompress(body, expected)?;

        if let Some(expected_crc) = checksum {
            let mut crc = Crc::new();
            crc.update(&stream);
            let actual = crc.sum();
            if actual != expected_crc {
                return Err(DeltavError::Decompression(format!(
                    "checksum mismatch: header {:#010x}, stream {:#010x}",
                    expected_crc, actual
                )));
            }
            debug!("Checksum verified ({:#010x})", actual);
        }

        let deltas =
            FrameSequence::from_stream(&stream, self.context, FrameStage::DeltaYuv420, frame_count)?;
        drop(stream);

        let yuv = temporal::inverse(deltas)?;
        color::inverse_all(yuv, self.config.parallel)
    }
}

/// Decode a framed payload using the geometry stored in its header.
pub fn decode_framed(payload: &[u8], config: CodecConfig) -> Result<DecodedVideo> {
    let (header, _) = Header::parse(payload)?;
    let frame_count = header.frame_count as usize;
    let config = CodecConfig {
        container: ContainerFormat::Framed,
        ..config
    };
    let pipeline = CodecPipeline::new(header.context, config)?;
    let rgb = pipeline.decode(payload, frame_count)?;

    Ok(DecodedVideo {
        context: header.context,
        frame_count,
        rgb,
    })
}
