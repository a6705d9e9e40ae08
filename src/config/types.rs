//! Core configuration types for a validation run
//!
//! One `ValidationConfig` is assembled at process start and passed by
//! reference into every component. Nothing re-reads the environment
//! mid-run, so a run's behavior is fully determined by its inputs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::registry::Category;
use crate::thresholds::ThresholdOverride;
use crate::utils::{
    DEFAULT_CARDS_PER_LOCALE, DEFAULT_CONCURRENCY, DEFAULT_IMAGE_SAMPLES,
    DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_MAX_RESPONSE_TIME_MS, DEFAULT_TIMEOUT_MS,
    DEFAULT_WARN_RESPONSE_TIME_MS,
};

/// Main configuration struct for one validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Base URL of the deployment under test, no trailing slash required
    pub base_url: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum simultaneous outbound requests within one validator's batch
    pub concurrency: usize,

    /// Random card pages drawn per locale
    pub cards_per_locale: usize,

    /// Random CDN images probed per run
    pub image_sample_count: usize,

    /// Build-artifact card inventory consumed by the sampler
    pub inventory_path: PathBuf,

    /// Commit identifier for report labeling
    pub commit: Option<String>,

    /// CI output channel; key-value results are appended when set
    pub ci_output_path: Option<PathBuf>,

    /// Hard response-time ceiling; slower pages fail
    pub max_response_time_ms: u64,

    /// Soft response-time ceiling; slower pages pass but are flagged
    pub warn_response_time_ms: u64,

    /// Hard payload ceiling for sampled pages
    pub max_payload_bytes: u64,

    /// Per-category threshold overrides parsed from the environment
    #[serde(skip)]
    pub threshold_overrides: BTreeMap<Category, ThresholdOverride>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            cards_per_locale: DEFAULT_CARDS_PER_LOCALE,
            image_sample_count: DEFAULT_IMAGE_SAMPLES,
            inventory_path: PathBuf::from("dist/data/cards.json"),
            commit: None,
            ci_output_path: None,
            max_response_time_ms: DEFAULT_MAX_RESPONSE_TIME_MS,
            warn_response_time_ms: DEFAULT_WARN_RESPONSE_TIME_MS,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            threshold_overrides: BTreeMap::new(),
        }
    }
}

impl ValidationConfig {
    /// Start from defaults with the one required field set
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-call timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_sample_sizes(mut self, cards_per_locale: usize, image_count: usize) -> Self {
        self.cards_per_locale = cards_per_locale;
        self.image_sample_count = image_count;
        self
    }

    #[must_use]
    pub fn with_inventory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inventory_path = path.into();
        self
    }

    #[must_use]
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    #[must_use]
    pub fn with_ci_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ci_output_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_performance_ceilings(mut self, warn_ms: u64, max_ms: u64, max_bytes: u64) -> Self {
        self.warn_response_time_ms = warn_ms;
        self.max_response_time_ms = max_ms;
        self.max_payload_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn with_threshold_override(mut self, category: Category, over: ThresholdOverride) -> Self {
        self.threshold_overrides.insert(category, over);
        self
    }
}
