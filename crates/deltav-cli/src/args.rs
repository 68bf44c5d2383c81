use clap::{Args, Parser, Subcommand};
use deltav_color::ChromaSampling;
use deltav_core::defaults;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compress raw RGB24 video with YUV420 + frame deltas + DEFLATE")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress raw RGB24 frames.
    Encode(EncodeArgs),
    /// Restore raw RGB24 frames from a compressed payload.
    Decode(DecodeArgs),
}

/// Options shared by both directions.
#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// JSON codec config; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bare zlib stream without the DLTV header.
    #[arg(long)]
    pub legacy: bool,

    /// Convert frames one at a time instead of on the thread pool.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Raw RGB24 input, or `-` for stdin.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Compressed output, or `-` for stdout.
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, default_value_t = defaults::WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = defaults::HEIGHT)]
    pub height: u32,

    /// zlib level, 0-9.
    #[arg(long)]
    pub level: Option<u32>,

    /// Chroma sampling: top-left or average.
    #[arg(long)]
    pub chroma: Option<ChromaSampling>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Compressed input, or `-` for stdin.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Raw RGB24 output, or `-` for stdout.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Frame width. Defaults to 384 with --legacy; otherwise checked
    /// against the header.
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height. Defaults to 216 with --legacy.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames. Required with --legacy.
    #[arg(long)]
    pub frames: Option<usize>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
