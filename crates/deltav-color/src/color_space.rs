//! BT.601 RGB↔YUV coefficients and per-pixel conversion.
#![allow(clippy::excessive_precision)]

use serde::{Deserialize, Serialize};

/// RGB to YUV matrix. U and V still need the +128 offset.
const RGB_TO_YUV: [[f32; 3]; 3] = [
    [0.299, 0.587, 0.114],
    [-0.169, -0.331, 0.449],
    [0.499, -0.418, -0.0813],
];

/// Chroma offset applied to U and V.
pub const CHROMA_OFFSET: f32 = 128.0;

/// How one U/V pair is chosen for each 2x2 pixel block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChromaSampling {
    /// Take the chroma of the block's top-left pixel.
    #[default]
    TopLeft,
    /// Average the chroma of all four pixels in the block.
    Average,
}

impl ChromaSampling {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::TopLeft => "top-left",
            Self::Average => "average",
        }
    }
}

impl std::str::FromStr for ChromaSampling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" => Ok(Self::TopLeft),
            "average" => Ok(Self::Average),
            other => Err(format!("unknown chroma sampling: {}", other)),
        }
    }
}

fn mat3_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Clamp to [0, 255] and truncate to 8 bits.
#[inline]
pub fn to_u8(x: f32) -> u8 {
    x.clamp(0.0, 255.0) as u8
}

/// Convert one RGB pixel to unclamped Y, U, V (U and V offset by 128).
#[inline]
pub fn rgb_to_yuv(rgb: [u8; 3]) -> [f32; 3] {
    let [y, u, v] = mat3_mul(
        &RGB_TO_YUV,
        [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32],
    );
    [y, u + CHROMA_OFFSET, v + CHROMA_OFFSET]
}

/// Convert stored Y, U, V samples back to an RGB pixel.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - CHROMA_OFFSET;
    let v = v as f32 - CHROMA_OFFSET;
    [
        to_u8(y + 1.402 * v),
        to_u8(y - 0.344 * u - 0.714 * v),
        to_u8(y + 1.772 * u),
    ]
}
