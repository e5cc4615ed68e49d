// THEORY:
// The `pipeline` module is the top-level API of the scoring engine. It strings the
// stages together in a fixed order and stops at the first stage that fails:
//
//     payload text --(payload)--> bytes --(decoder)--> raster
//                  --(sampler)--> linear average --(scorer + color_literal)--> ColorMatch
//
// Every stage has its own error type; `ScoreError` only says which stage failed and
// carries that stage's error untouched. Nothing is retried and no partial result is
// ever returned next to an error. A fully transparent image is not a failure: it
// averages to black and is scored like any other color.
//
// The pipeline holds only immutable configuration, so one instance can be shared by
// any number of threads.

use crate::core_modules::color_literal::{InvalidColorLiteral, parse_color_literal};
use crate::core_modules::decoder::{DecodeError, DecodeLimits, decode_raster};
use crate::core_modules::payload::{EncodingError, decode_image_payload};
use crate::core_modules::sampler::average_linear_color;
use crate::core_modules::scorer::{ColorMatch, score_against};
use thiserror::Error;

/// Configuration for the ScoringPipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub decode_limits: DecodeLimits,
}

/// Which stage stopped the pipeline, and why.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("bad image: {0}")]
    Encoding(#[from] EncodingError),
    #[error("decode fail: {0}")]
    Decode(#[from] DecodeError),
    #[error("bad theme_hex: {0}")]
    InvalidColorLiteral(#[from] InvalidColorLiteral),
}

/// The main, top-level struct of the scoring engine.
#[derive(Debug, Clone, Default)]
pub struct ScoringPipeline {
    config: PipelineConfig,
}

impl ScoringPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Scores already-decoded image bytes against `reference_hex`.
    ///
    /// The image is decoded before the literal is parsed, so a request with both a
    /// broken image and a broken color reports the image.
    pub fn score(&self, image_bytes: &[u8], reference_hex: &str) -> Result<ColorMatch, ScoreError> {
        let raster = decode_raster(image_bytes, &self.config.decode_limits)?;
        let reference = parse_color_literal(reference_hex)?;
        let average = average_linear_color(&raster);
        let result = score_against(&average.color, reference);
        tracing::debug!(
            format = raster.format_name(),
            samples = average.samples,
            score = result.score,
            avg = %result.avg_color_hex,
            "scored image"
        );
        Ok(result)
    }

    /// Scores a base64 payload (data URI, URL-safe and unpadded forms accepted).
    pub fn score_payload(&self, payload: &str, reference_hex: &str) -> Result<ColorMatch, ScoreError> {
        let image_bytes = decode_image_payload(payload)?;
        self.score(&image_bytes, reference_hex)
    }
}

/// Scores `image_bytes` against `reference_hex` with default limits.
pub fn score(image_bytes: &[u8], reference_hex: &str) -> Result<ColorMatch, ScoreError> {
    ScoringPipeline::default().score(image_bytes, reference_hex)
}
