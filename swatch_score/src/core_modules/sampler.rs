// THEORY:
// The `sampler` reduces a whole raster to one color: its alpha-weighted average in
// linear light. Two ideas shape it.
//
// 1.  **Bounded work**: an image of any size is visited on a regular grid whose
//     stride is chosen so that roughly `MAX_SAMPLES` pixels are read. A 64x64 icon is
//     read in full; a 6000x4000 photo is read every 76th pixel in both axes. The
//     right and bottom edges may be skipped when the stride does not divide the
//     extent. That bias is accepted; it keeps the cost flat.
// 2.  **Alpha as weight**: each visited pixel contributes its linear color scaled by
//     its alpha, and the alpha itself is summed as the weight. A fully transparent
//     pixel contributes nothing at all, a half transparent one contributes half.
//     If nothing carried any weight, the average is defined as black.
//
// Samples arrive already premultiplied by the raster, so a translucent pixel is
// both dimmed and down-weighted: 50% white averages to 0x80 gray, not white.

use crate::core_modules::color_space::srgb_to_linear;
use crate::core_modules::raster::{Raster, SAMPLE_MAX};

/// Upper bound the stride is derived from.
pub const MAX_SAMPLES: u64 = 4096;

/// A color in linear light, each channel nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl LinearColor {
    pub const BLACK: LinearColor = LinearColor {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Euclidean distance inside the unit RGB cube.
    pub fn distance(&self, other: &LinearColor) -> f64 {
        let dr = self.red - other.red;
        let dg = self.green - other.green;
        let db = self.blue - other.blue;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// The result of one pass over a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledAverage {
    /// Alpha-weighted mean, or black when `total_weight` is zero.
    pub color: LinearColor,
    /// How many coordinates were read.
    pub samples: u64,
    /// Grid stride used in both axes.
    pub step: u32,
    /// Sum of the normalized alpha of every visited pixel.
    pub total_weight: f64,
}

/// Grid stride for a `width` x `height` raster:
/// `max(1, floor(sqrt(floor(width * height / MAX_SAMPLES))))`.
pub fn sampling_step(width: u32, height: u32) -> u32 {
    let area = u64::from(width) * u64::from(height);
    let step = ((area / MAX_SAMPLES) as f64).sqrt() as u32;
    step.max(1)
}

/// Alpha-weighted linear average of `raster`, read on a strided grid.
pub fn average_linear_color<R: Raster + ?Sized>(raster: &R) -> SampledAverage {
    let (width, height) = raster.dimensions();
    let step = sampling_step(width, height);
    let scale = f64::from(SAMPLE_MAX);

    let mut sum_red = 0.0f64;
    let mut sum_green = 0.0f64;
    let mut sum_blue = 0.0f64;
    let mut sum_weight = 0.0f64;
    let mut samples = 0u64;

    for y in (0..height).step_by(step as usize) {
        for x in (0..width).step_by(step as usize) {
            let [red, green, blue, alpha] = raster.sample(x, y);
            let weight = f64::from(alpha) / scale;
            sum_red += srgb_to_linear(f64::from(red) / scale) * weight;
            sum_green += srgb_to_linear(f64::from(green) / scale) * weight;
            sum_blue += srgb_to_linear(f64::from(blue) / scale) * weight;
            sum_weight += weight;
            samples += 1;
        }
    }

    let color = if sum_weight == 0.0 {
        LinearColor::BLACK
    } else {
        LinearColor::new(
            sum_red / sum_weight,
            sum_green / sum_weight,
            sum_blue / sum_weight,
        )
    };

    tracing::debug!(width, height, step, samples, total_weight = sum_weight, "sampled raster");

    SampledAverage {
        color,
        samples,
        step,
        total_weight: sum_weight,
    }
}
