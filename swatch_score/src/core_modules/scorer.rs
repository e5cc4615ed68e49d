// THEORY:
// The `scorer` answers one question: how close is the sampled average to the theme
// color? Both colors are compared in linear light, inside the unit RGB cube, so the
// largest possible gap is the cube's diagonal, sqrt(3). The score is the remaining
// fraction of that diagonal, as a percentage:
//
//     score = 100 * (1 - distance / sqrt(3))
//
// clamped to [0, 100] and rounded to one decimal, half away from zero. Identical
// colors score 100.0; black against opaque white scores exactly 0.0, because sRGB
// 0 and 255 linearize to exactly 0.0 and 1.0.
//
// The sampled average is also handed back as a `#rrggbb` string so callers can see
// what the engine "saw".

use crate::core_modules::color_literal::PerceptualColor;
use crate::core_modules::color_space::{linear_to_srgb, srgb_byte_to_linear};
use crate::core_modules::sampler::LinearColor;

/// Identifies how `score` was produced.
pub const METHOD: &str = "linear-srgb-euclidean(sampled)";

const MAX_SCORE: f64 = 100.0;

/// Outcome of comparing an image to a theme color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatch {
    /// Similarity in `[0, 100]`, one decimal.
    pub score: f64,
    /// The sampled average color as `#rrggbb`.
    pub avg_color_hex: String,
    pub method: &'static str,
}

impl LinearColor {
    /// Linearizes an 8-bit sRGB color.
    pub fn from_perceptual(color: PerceptualColor) -> Self {
        LinearColor::new(
            srgb_byte_to_linear(color.red),
            srgb_byte_to_linear(color.green),
            srgb_byte_to_linear(color.blue),
        )
    }
}

impl PerceptualColor {
    /// Re-encodes a linear color, rounding and clamping each channel to a byte.
    pub fn from_linear(color: LinearColor) -> Self {
        PerceptualColor::new(
            encode_channel(color.red),
            encode_channel(color.green),
            encode_channel(color.blue),
        )
    }
}

fn encode_channel(linear: f64) -> u8 {
    let value = (linear_to_srgb(linear) * 255.0).round();
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// Rounds to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Raw similarity in `[0, 100]` before rounding.
pub fn similarity(sample: &LinearColor, reference: &LinearColor) -> f64 {
    let max_distance = 3.0f64.sqrt();
    let distance = sample.distance(reference);
    (MAX_SCORE * (1.0 - distance / max_distance)).clamp(0.0, MAX_SCORE)
}

/// Scores `sample` against the theme color `reference`.
pub fn score_against(sample: &LinearColor, reference: PerceptualColor) -> ColorMatch {
    let reference = LinearColor::from_perceptual(reference);
    ColorMatch {
        score: round_to_tenth(similarity(sample, &reference)),
        avg_color_hex: PerceptualColor::from_linear(*sample).to_string(),
        method: METHOD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: PerceptualColor = PerceptualColor::new(255, 255, 255);

    #[test]
    fn identical_colors_score_one_hundred() {
        for reference in [
            PerceptualColor::BLACK,
            WHITE,
            PerceptualColor::new(18, 52, 86),
            PerceptualColor::new(250, 3, 128),
        ] {
            let sample = LinearColor::from_perceptual(reference);
            let result = score_against(&sample, reference);
            assert_eq!(result.score, 100.0);
            assert_eq!(result.avg_color_hex, reference.to_string());
            assert_eq!(result.method, METHOD);
        }
    }

    #[test]
    fn black_against_white_scores_exactly_zero() {
        let white = LinearColor::from_perceptual(WHITE);
        assert_eq!(white, LinearColor::new(1.0, 1.0, 1.0));
        assert_eq!(score_against(&white, PerceptualColor::BLACK).score, 0.0);
        assert_eq!(score_against(&LinearColor::BLACK, WHITE).score, 0.0);
    }

    #[test]
    fn single_channel_gap_scores_known_value() {
        // distance 1 of sqrt(3): 100 * (1 - 0.57735) = 42.2649...
        let red = LinearColor::new(1.0, 0.0, 0.0);
        assert_eq!(score_against(&red, PerceptualColor::BLACK).score, 42.3);
    }

    #[test]
    fn score_is_clamped_for_out_of_cube_samples() {
        let far = LinearColor::new(5.0, 5.0, 5.0);
        assert_eq!(similarity(&far, &LinearColor::BLACK), 0.0);
        let result = score_against(&far, PerceptualColor::BLACK);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.avg_color_hex, "#ffffff");

        let below = LinearColor::new(-1.0, -1.0, -1.0);
        assert_eq!(PerceptualColor::from_linear(below).to_string(), "#000000");
    }

    #[test]
    fn score_stays_in_bounds_across_the_cube() {
        let steps = [0u8, 1, 10, 64, 127, 128, 200, 254, 255];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let sample = LinearColor::from_perceptual(PerceptualColor::new(r, g, b));
                    for reference in [PerceptualColor::BLACK, WHITE, PerceptualColor::new(b, r, g)] {
                        let score = score_against(&sample, reference).score;
                        assert!((0.0..=100.0).contains(&score), "{score} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to_tenth(12.25), 12.3);
        assert_eq!(round_to_tenth(99.94), 99.9);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[test]
    fn linear_mid_grey_encodes_to_bc() {
        // 0.5 linear is 187.5 / 255 in sRGB, which rounds to 188 (0xbc).
        let grey = LinearColor::new(0.5, 0.5, 0.5);
        assert_eq!(PerceptualColor::from_linear(grey).to_string(), "#bcbcbc");
    }
}
