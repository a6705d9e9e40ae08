//! Run orchestration
//!
//! Sequences one validation run: load the inventory (fail-loud — a missing
//! build artifact is a configuration problem, not a target problem),
//! generate the sample set, run the validator phases one after another
//! (each internally concurrent), evaluate thresholds through the category
//! registry, and assemble the immutable run summary.
//!
//! Validators never let a per-item failure escape; the only errors that
//! propagate out of here are configuration-level ones, and the binary
//! turns those into exit code 1.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use reqwest::Client;

use crate::config::ValidationConfig;
use crate::registry::Category;
use crate::sampler::{CardInventory, SampleOptions, generate_url_samples};
use crate::thresholds::{
    ThresholdResult, effective_thresholds, evaluate_threshold, summarize_thresholds,
};
use crate::utils::VALIDATOR_USER_AGENT;
use crate::validators::performance::PerfStats;
use crate::validators::{
    CategoryOutcome, accessibility, bundles, deltas, endpoints, error_pages, html, images, links,
    locales, pages, performance, seo,
};

/// The run-level aggregate: created once at the end of a run, immutable,
/// the sole artifact handed to the report renderer and CI output writer
#[derive(Debug)]
pub struct ValidationSummary {
    pub base_url: String,
    pub commit: Option<String>,
    pub started_at: DateTime<Utc>,
    pub categories: BTreeMap<Category, CategoryOutcome>,
    pub thresholds: Vec<ThresholdResult>,
    pub perf_stats: Option<PerfStats>,
    pub success: bool,
    pub hard_failures: Vec<Category>,
    pub soft_failures: Vec<Category>,
    pub warnings: Vec<Category>,
    pub duration: Duration,
}

fn build_client(config: &ValidationConfig) -> Result<Client> {
    Client::builder()
        .user_agent(VALIDATOR_USER_AGENT)
        .connect_timeout(config.timeout())
        .build()
        .context("failed to build HTTP client")
}

/// Run the full validation suite against the configured deployment.
///
/// # Errors
///
/// Configuration-level problems only: unreadable inventory, unbuildable
/// HTTP client. Target-level problems become category results instead.
pub async fn run_validation(config: &ValidationConfig) -> Result<ValidationSummary> {
    let started = Instant::now();
    let started_at = Utc::now();

    info!("validating deployment at {}", config.base_url);
    let inventory = CardInventory::load(&config.inventory_path)?;
    let samples = generate_url_samples(
        &inventory,
        &SampleOptions {
            cards_per_locale: config.cards_per_locale,
            image_count: config.image_sample_count,
        },
    );
    info!(
        "sampled {} pages and {} images from {} cards",
        samples.pages.len(),
        samples.images.len(),
        inventory.cards.len()
    );

    let client = build_client(config)?;
    let mut categories: BTreeMap<Category, CategoryOutcome> = BTreeMap::new();
    let mut perf_stats = None;

    // Phases run in registry order, one at a time; each is internally
    // concurrent up to the configured batch width
    for category in Category::ALL {
        let phase_started = Instant::now();
        info!("phase: {}", category.spec().display_name);

        let outcome = match category {
            Category::LocaleRedirects => {
                locales::validate_locale_redirects(&client, config).await
            }
            Category::Pages => pages::validate_pages(&client, &samples.pages, config).await,
            Category::Html => html::validate_html(&client, &samples.pages, config).await,
            Category::Links => links::validate_links(&client, &samples, config).await,
            Category::Seo => seo::validate_seo(&client, &samples.pages, config).await,
            Category::Endpoints => endpoints::validate_endpoints(&client, config).await,
            Category::Bundles => bundles::validate_bundles(&client, config).await,
            Category::ErrorPages => error_pages::validate_error_pages(&client, config).await,
            Category::Images => images::validate_images(&client, &samples.images, config).await,
            Category::Accessibility => {
                accessibility::validate_accessibility(&client, &samples.pages, config).await
            }
            Category::Performance => {
                let (outcome, stats) =
                    performance::validate_performance(&client, &samples, config).await;
                perf_stats = stats;
                outcome
            }
            Category::Deltas => deltas::validate_deltas(&client, config).await,
        };

        info!(
            "phase {} finished: {}/{} passed in {:?}",
            category.spec().display_name,
            outcome.passed,
            outcome.total(),
            phase_started.elapsed()
        );
        categories.insert(*category, outcome);
    }

    let effective = effective_thresholds(&config.threshold_overrides);
    let thresholds: Vec<ThresholdResult> = Category::ALL
        .iter()
        .map(|category| {
            let (passed, total) = categories
                .get(category)
                .map_or((0, 0), |outcome| (outcome.passed, outcome.total()));
            let rule = effective
                .get(category)
                .copied()
                .unwrap_or(category.spec().default_threshold);
            evaluate_threshold(*category, passed, total, &rule)
        })
        .collect();

    let verdict = summarize_thresholds(&thresholds);

    Ok(ValidationSummary {
        base_url: config.base_url.clone(),
        commit: config.commit.clone(),
        started_at,
        categories,
        thresholds,
        perf_stats,
        success: verdict.success,
        hard_failures: verdict.hard_failures,
        soft_failures: verdict.soft_failures,
        warnings: verdict.warnings,
        duration: started.elapsed(),
    })
}
