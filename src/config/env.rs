//! Environment assembly for `ValidationConfig`
//!
//! Recognized variables:
//! - `SITE_BASE_URL` (required) — deployment under test
//! - `SITE_TIMEOUT_MS`, `SITE_CONCURRENCY` — probe tuning
//! - `SITE_CARDS_PER_LOCALE`, `SITE_IMAGE_SAMPLES` — sample sizes
//! - `SITE_INVENTORY_PATH` — card inventory artifact
//! - `COMMIT_SHA` — report label
//! - `GITHUB_OUTPUT` — CI output channel
//! - `THRESHOLD_<CATEGORY>_{MIN_PASS_RATE,MAX_FAILURES,HARD_FAILURE}`
//!
//! Invalid numeric values fall back to the default with a warning rather
//! than aborting the run.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::warn;

use super::ValidationConfig;
use crate::registry::Category;
use crate::thresholds::override_from_env;

/// Parse an env var, keeping `default` when unset or unparseable
fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}='{raw}', using default");
            default
        }),
        Err(_) => default,
    }
}

impl ValidationConfig {
    /// Assemble the run configuration from the environment, once.
    ///
    /// # Errors
    ///
    /// Fails only when `SITE_BASE_URL` is absent — every other entry has
    /// a usable default.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SITE_BASE_URL")
            .context("SITE_BASE_URL must point at the deployment under test")?;

        let defaults = ValidationConfig::default();
        let mut config = ValidationConfig {
            base_url,
            timeout_ms: env_or("SITE_TIMEOUT_MS", defaults.timeout_ms),
            concurrency: env_or("SITE_CONCURRENCY", defaults.concurrency),
            cards_per_locale: env_or("SITE_CARDS_PER_LOCALE", defaults.cards_per_locale),
            image_sample_count: env_or("SITE_IMAGE_SAMPLES", defaults.image_sample_count),
            inventory_path: std::env::var("SITE_INVENTORY_PATH")
                .map_or(defaults.inventory_path, PathBuf::from),
            commit: std::env::var("COMMIT_SHA").ok(),
            ci_output_path: std::env::var("GITHUB_OUTPUT").ok().map(PathBuf::from),
            max_response_time_ms: env_or("SITE_MAX_RESPONSE_TIME_MS", defaults.max_response_time_ms),
            warn_response_time_ms: env_or(
                "SITE_WARN_RESPONSE_TIME_MS",
                defaults.warn_response_time_ms,
            ),
            max_payload_bytes: env_or("SITE_MAX_PAYLOAD_BYTES", defaults.max_payload_bytes),
            threshold_overrides: defaults.threshold_overrides,
        };

        for category in Category::ALL {
            let over = override_from_env(*category);
            if !over.is_empty() {
                config.threshold_overrides.insert(*category, over);
            }
        }

        Ok(config)
    }
}
