// THEORY:
// The `color_space` module is the mathematical floor of the scoring engine. Every
// other stage eventually calls into it. Stored pixel values are gamma-encoded: equal
// steps in the stored number are roughly equal steps in *perceived* brightness, not
// in emitted light. Averaging or measuring distances on those numbers directly is
// biased toward the dark end, so the sampler and scorer first remove the gamma curve.
//
// Two pure functions cover both directions of the standard sRGB transfer curve:
// - `srgb_to_linear`: piecewise linear toe below 0.04045, 2.4 power law above it.
// - `linear_to_srgb`: the exact inverse, toe below 0.0031308.
//
// Neither function clamps. Callers decide what out-of-range values mean.
//
// The reference color of a request always arrives as 8-bit channels, so a 256-entry
// `OnceLock` table caches the byte → linear mapping. Every entry is computed with
// `srgb_to_linear` itself, so the table and the function never disagree.

use std::sync::OnceLock;

pub type GammaChannel = f64;
pub type LinearChannel = f64;

const SRGB_TOE: GammaChannel = 0.04045;
const LINEAR_TOE: LinearChannel = 0.0031308;
const TOE_SLOPE: f64 = 12.92;
const OFFSET: f64 = 0.055;
const SCALE: f64 = 1.055;
const GAMMA: f64 = 2.4;

static SRGB_BYTE_TO_LINEAR_LUT: OnceLock<[LinearChannel; 256]> = OnceLock::new();

/// Removes the sRGB transfer curve from a gamma-encoded channel value.
#[inline]
pub fn srgb_to_linear(c: GammaChannel) -> LinearChannel {
    if c <= SRGB_TOE {
        c / TOE_SLOPE
    } else {
        ((c + OFFSET) / SCALE).powf(GAMMA)
    }
}

/// Applies the sRGB transfer curve to a light-linear channel value.
#[inline]
pub fn linear_to_srgb(c: LinearChannel) -> GammaChannel {
    if c <= LINEAR_TOE {
        TOE_SLOPE * c
    } else {
        SCALE * c.powf(1.0 / GAMMA) - OFFSET
    }
}

/// Linear value of an 8-bit sRGB channel, i.e. `srgb_to_linear(byte / 255)`.
#[inline]
pub fn srgb_byte_to_linear(byte: u8) -> LinearChannel {
    let table = SRGB_BYTE_TO_LINEAR_LUT.get_or_init(|| {
        let mut table = [0.0f64; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = srgb_to_linear(value as f64 / 255.0);
        }
        table
    });
    table[byte as usize]
}
