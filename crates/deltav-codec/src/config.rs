//! Codec configuration, persisted as JSON.

use deltav_color::ChromaSampling;
use deltav_core::{DeltavError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::container::ContainerFormat;
use crate::entropy::MAX_LEVEL;

/// Settings for one encode or decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// zlib level, 0-9.
    pub compression_level: u32,
    /// How chroma is picked for each 2x2 block when encoding.
    pub chroma_sampling: ChromaSampling,
    /// Framed (with header) or legacy (bare stream) payloads.
    pub container: ContainerFormat,
    /// Fan per-frame work out over the rayon pool.
    pub parallel: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_level: MAX_LEVEL,
            chroma_sampling: ChromaSampling::TopLeft,
            container: ContainerFormat::Framed,
            parallel: true,
        }
    }
}

impl CodecConfig {
    /// Settings for bare, headerless payloads.
    pub fn legacy() -> Self {
        Self {
            container: ContainerFormat::Legacy,
            ..Self::default()
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_LEVEL {
            return Err(DeltavError::InvalidParameter(format!(
                "compression_level must be 0-{}, got {}",
                MAX_LEVEL, self.compression_level
            )));
        }
        Ok(())
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| DeltavError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Deserialize from JSON bytes. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| DeltavError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
