//! Lossless entropy stage: a zlib (DEFLATE) stream over the frame bytes.

use deltav_core::{DeltavError, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{ErrorKind, Read, Write};
use tracing::debug;

/// Highest zlib compression level.
pub const MAX_LEVEL: u32 = 9;

/// Largest output-to-input ratio DEFLATE can reach (a 258-byte match in
/// two bits).
const MAX_EXPANSION: usize = 1032;

/// A generic lossless stream compressor.
pub trait EntropyBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Compress `chunks` in order as one continuous stream.
    fn compress(&self, chunks: &[&[u8]]) -> Result<Vec<u8>>;

    /// Decompress exactly `expected_len` bytes.
    ///
    /// Fewer bytes, or input left over after the stream, is a
    /// `Decompression` error; more output is a `DimensionMismatch`.
    fn decompress(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

/// zlib-wrapped DEFLATE via `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct ZlibBackend {
    level: u32,
}

impl Default for ZlibBackend {
    fn default() -> Self {
        Self { level: MAX_LEVEL }
    }
}

impl ZlibBackend {
    /// Create a backend at the given level (0-9).
    pub fn new(level: u32) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(DeltavError::InvalidParameter(format!(
                "compression level {} is out of range (0-{})",
                level, MAX_LEVEL
            )));
        }
        Ok(Self { level })
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl EntropyBackend for ZlibBackend {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, chunks: &[&[u8]]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));

        for (i, chunk) in chunks.iter().enumerate() {
            encoder
                .write_all(chunk)
                .map_err(|e| DeltavError::Compression(format!("chunk {}: {}", i, e)))?;
        }

        let compressed = encoder
            .finish()
            .map_err(|e| DeltavError::Compression(format!("finishing stream: {}", e)))?;

        debug!(
            "Compressed {} chunks into {} bytes (level {})",
            chunks.len(),
            compressed.len(),
            self.level
        );
        Ok(compressed)
    }

    fn decompress(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let limit = payload.len().saturating_mul(MAX_EXPANSION);
        if expected_len > limit {
            return Err(DeltavError::Decompression(format!(
                "{} compressed bytes cannot hold {} bytes",
                payload.len(),
                expected_len
            )));
        }

        let mut decoder = ZlibDecoder::new(payload);
        let mut out = Vec::new();
        out.try_reserve_exact(expected_len)?;

        decoder
            .by_ref()
            .take(expected_len as u64)
            .read_to_end(&mut out)
            .map_err(|e| DeltavError::Decompression(e.to_string()))?;
        if out.len() < expected_len {
            return Err(DeltavError::Decompression(format!(
                "stream ended after {} of {} bytes",
                out.len(),
                expected_len
            )));
        }

        // Reading past the expected end also makes the decoder check the
        // zlib trailer.
        let mut probe = [0u8; 1];
        loop {
            match decoder.read(&mut probe) {
                Ok(0) => break,
                Ok(_) => {
                    return Err(DeltavError::DimensionMismatch {
                        expected: format!("{} decompressed bytes", expected_len),
                        got: "a longer stream".to_string(),
                    })
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(DeltavError::Decompression(e.to_string())),
            }
        }

        let consumed = decoder.total_in();
        if consumed != payload.len() as u64 {
            return Err(DeltavError::Decompression(format!(
                "{} trailing bytes after the zlib stream",
                payload.len() as u64 - consumed.min(payload.len() as u64)
            )));
        }

        debug!("Decompressed {} bytes into {} bytes", payload.len(), out.len());
        Ok(out)
    }
}
