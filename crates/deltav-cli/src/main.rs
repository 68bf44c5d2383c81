//! deltav - raw RGB24 video compressor
//!
//! Entry point for the encode/decode commands.

mod args;
mod commands;

use anyhow::Result;
use args::{parse_args, Command};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Logs go to stderr so stdout can carry payloads and reports.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = parse_args();
    match cli.command {
        Command::Encode(args) => {
            let report = commands::run_encode(&args)?;
            info!("Encoding complete");
            if args.output.as_os_str() != "-" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Command::Decode(args) => {
            let report = commands::run_decode(&args)?;
            info!("Decoding complete");
            if args.output.as_os_str() != "-" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}
