use std::str::FromStr;
use swatch_score::{DecodeLimits, PipelineConfig};

const DEFAULT_PORT: &str = "8080";
const DEFAULT_MAX_BODY_BYTES: usize = 10 << 20; // 10 MiB

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Requests with a larger body are refused with 413.
    pub max_body_bytes: usize,
    /// Tokio worker threads.
    pub worker_threads: usize,
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            worker_threads: num_cpus::get(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `SWATCH_BIND` / `PORT`, `SWATCH_MAX_BODY_BYTES`, `SWATCH_WORKERS`,
    /// `SWATCH_MAX_IMAGE_DIM` and `SWATCH_MAX_ALLOC_BYTES` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with variables supplied by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limits = defaults.pipeline.decode_limits;
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = match (non_empty("SWATCH_BIND"), non_empty("PORT")) {
            (Some(bind), _) => bind,
            (None, Some(port)) => format!("0.0.0.0:{}", port.trim()),
            (None, None) => defaults.bind_addr,
        };

        Self {
            bind_addr,
            max_body_bytes: parse_or(&non_empty, "SWATCH_MAX_BODY_BYTES", defaults.max_body_bytes),
            worker_threads: parse_or(&non_empty, "SWATCH_WORKERS", defaults.worker_threads).max(1),
            pipeline: PipelineConfig {
                decode_limits: DecodeLimits {
                    max_image_dim: parse_or(&non_empty, "SWATCH_MAX_IMAGE_DIM", limits.max_image_dim),
                    max_alloc_bytes: parse_or(&non_empty, "SWATCH_MAX_ALLOC_BYTES", limits.max_alloc_bytes),
                },
            },
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "ignoring unparsable setting");
            default
        }),
    }
}
