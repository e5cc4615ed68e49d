// THEORY:
// This file is the public face of the `swatch_score` library crate. Callers (the
// HTTP server, the command-line runner, anyone embedding the engine) should only
// need the `ScoringPipeline` and the handful of types re-exported below. The stage
// modules under `core_modules` stay public for callers that want a single stage,
// e.g. only the base64 normalizer or only the sampler.

pub mod core_modules;
pub mod pipeline;

pub use core_modules::color_literal::{InvalidColorLiteral, PerceptualColor, parse_color_literal};
pub use core_modules::decoder::{DecodeError, DecodeLimits, DecodedRaster, decode_raster};
pub use core_modules::inspect::{PayloadReport, inspect_payload};
pub use core_modules::payload::{EncodingError, decode_image_payload};
pub use core_modules::raster::Raster;
pub use core_modules::sampler::{LinearColor, SampledAverage, average_linear_color};
pub use core_modules::scorer::{ColorMatch, METHOD};
pub use pipeline::{PipelineConfig, ScoreError, ScoringPipeline, score};
