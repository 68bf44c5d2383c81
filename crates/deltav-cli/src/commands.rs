//! Encode and decode commands.

use anyhow::{bail, Context, Result};
use deltav_codec::{CodecConfig, CodecPipeline, ContainerFormat, Header};
use deltav_color::ChromaSampling;
use deltav_core::{defaults, VideoContext};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use tracing::info;

use crate::args::{CodecArgs, DecodeArgs, EncodeArgs};

/// Summary printed after an encode.
#[derive(Debug, Serialize)]
pub struct EncodeReport {
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub container: ContainerFormat,
    pub original_size: usize,
    pub yuv_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: String,
}

/// Summary printed after a decode.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub size: usize,
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok(());
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

/// Build the codec config: config file first, then flags.
pub fn codec_config(
    args: &CodecArgs,
    level: Option<u32>,
    chroma: Option<ChromaSampling>,
) -> Result<CodecConfig> {
    let mut config = match &args.config {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };

    if args.legacy {
        config.container = ContainerFormat::Legacy;
    }
    if args.sequential {
        config.parallel = false;
    }
    if let Some(level) = level {
        config.compression_level = level;
    }
    if let Some(chroma) = chroma {
        config.chroma_sampling = chroma;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_encode(args: &EncodeArgs) -> Result<EncodeReport> {
    let config = codec_config(&args.codec, args.level, args.chroma)?;
    let context = VideoContext::new(args.width, args.height)?;
    let pipeline = CodecPipeline::new(context, config)?;

    let input = open_input(&args.input)?;
    let encoded = pipeline
        .encode_reader(input)
        .with_context(|| format!("encoding {}", args.input.display()))?;
    if encoded.frame_count == 0 {
        bail!(
            "no complete {} frame in {} (need {} bytes per frame)",
            context,
            args.input.display(),
            context.frame_size()
        );
    }

    write_output(&args.output, &encoded.payload)?;
    info!("Wrote {} bytes to {}", encoded.payload.len(), args.output.display());

    let stats = encoded.stats;
    Ok(EncodeReport {
        width: context.width(),
        height: context.height(),
        frame_count: encoded.frame_count,
        container: config.container,
        original_size: stats.raw_size,
        yuv_size: stats.yuv_size,
        compressed_size: stats.compressed_size,
        compression_ratio: format!("{:.2}%", stats.space_saving()),
    })
}

pub fn run_decode(args: &DecodeArgs) -> Result<DecodeReport> {
    let config = codec_config(&args.codec, None, None)?;

    let mut payload = Vec::new();
    open_input(&args.input)?
        .read_to_end(&mut payload)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let (context, frame_count) = match config.container {
        ContainerFormat::Legacy => {
            let Some(frames) = args.frames else {
                bail!("--frames is required for legacy payloads");
            };
            let context = VideoContext::new(
                args.width.unwrap_or(defaults::WIDTH),
                args.height.unwrap_or(defaults::HEIGHT),
            )?;
            (context, frames)
        }
        ContainerFormat::Framed => {
            // Flags that were given are cross-checked by the pipeline.
            let (header, _) = Header::parse(&payload)?;
            let context = VideoContext::new(
                args.width.unwrap_or(header.context.width()),
                args.height.unwrap_or(header.context.height()),
            )?;
            (context, args.frames.unwrap_or(header.frame_count as usize))
        }
    };

    let pipeline = CodecPipeline::new(context, config)?;
    let rgb = pipeline
        .decode(&payload, frame_count)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    write_output(&args.output, &rgb)?;
    info!("Wrote {} frames ({} bytes) to {}", frame_count, rgb.len(), args.output.display());

    Ok(DecodeReport {
        width: context.width(),
        height: context.height(),
        frame_count,
        size: rgb.len(),
    })
}
