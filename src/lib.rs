pub mod config;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod retry;
pub mod sampler;
pub mod thresholds;
pub mod utils;
pub mod validators;

pub use config::ValidationConfig;
pub use orchestrator::{ValidationSummary, run_validation};
pub use registry::{Category, CategorySpec, REGISTRY};
pub use report::{render_report, write_ci_outputs};
pub use retry::{RetryOptions, RetryOutcome, fetch_with_retry, with_retry};
pub use sampler::{
    CardInventory, CardRecord, SUPPORTED_LOCALES, SampleCategory, SampleOptions, SampleSet,
    UrlSample, generate_url_samples,
};
pub use thresholds::{
    ThresholdConfig, ThresholdOverride, ThresholdResult, ThresholdSummary, evaluate_threshold,
    summarize_thresholds,
};
pub use validators::{
    CategoryOutcome, CheckOutcome, NotFoundMode, ValidationResult, ValidationStatus, run_batched,
};
