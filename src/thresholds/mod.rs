//! Threshold policy engine
//!
//! Maps each category's raw pass/total counts to a pass/fail verdict using
//! per-category rules (minimum pass rate, absolute failure cap, hard-vs-soft
//! classification) and aggregates categories into the overall run verdict.
//!
//! Rules:
//! - zero total trivially passes (nothing to validate)
//! - an absolute `max_failures` cap takes precedence over the pass rate,
//!   so a huge sample can't hide many broken items behind a high percentage
//! - otherwise pass iff `passed / total >= min_pass_rate`
//! - the run succeeds iff there are zero hard failures; soft failures warn

use std::collections::BTreeMap;

use log::warn;

use crate::registry::Category;

/// Per-category threshold rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// Minimum fraction of items that must pass, in [0, 1]
    pub min_pass_rate: f64,
    /// Absolute cap on failures; when set it overrides `min_pass_rate`
    pub max_failures: Option<usize>,
    /// Hard failures block the deployment verdict; soft ones only warn
    pub hard_failure: bool,
}

impl ThresholdConfig {
    /// Deployment-blocking rule at the given pass rate
    #[must_use]
    pub const fn hard(min_pass_rate: f64) -> Self {
        Self {
            min_pass_rate,
            max_failures: None,
            hard_failure: true,
        }
    }

    /// Warning-only rule at the given pass rate
    #[must_use]
    pub const fn soft(min_pass_rate: f64) -> Self {
        Self {
            min_pass_rate,
            max_failures: None,
            hard_failure: false,
        }
    }

    /// Add an absolute failure cap (stricter-wins over the rate)
    #[must_use]
    pub const fn with_max_failures(mut self, cap: usize) -> Self {
        self.max_failures = Some(cap);
        self
    }
}

/// Partial override parsed from `THRESHOLD_<CATEGORY>_*` env entries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverride {
    pub min_pass_rate: Option<f64>,
    pub max_failures: Option<usize>,
    pub hard_failure: Option<bool>,
}

impl ThresholdOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_pass_rate.is_none() && self.max_failures.is_none() && self.hard_failure.is_none()
    }

    /// Layer this override on top of a default rule
    #[must_use]
    pub fn apply(&self, base: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            min_pass_rate: self.min_pass_rate.unwrap_or(base.min_pass_rate),
            max_failures: self.max_failures.or(base.max_failures),
            hard_failure: self.hard_failure.unwrap_or(base.hard_failure),
        }
    }
}

/// Verdict for one category in one run
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub category: Category,
    pub passed: bool,
    pub hard_failure: bool,
    pub pass_rate: f64,
    pub pass_count: usize,
    pub total_count: usize,
    pub failure_count: usize,
    pub message: String,
}

/// Partition of a run's threshold results
#[derive(Debug, Clone, Default)]
pub struct ThresholdSummary {
    /// Failed categories that block the deployment
    pub hard_failures: Vec<Category>,
    /// Failed categories that only warn
    pub soft_failures: Vec<Category>,
    /// Categories that passed their threshold but below 100%
    pub warnings: Vec<Category>,
    /// True iff `hard_failures` is empty
    pub success: bool,
}

/// Evaluate one category's counts against its threshold rule
#[must_use]
pub fn evaluate_threshold(
    category: Category,
    passed: usize,
    total: usize,
    threshold: &ThresholdConfig,
) -> ThresholdResult {
    let display = category.spec().display_name;

    if total == 0 {
        return ThresholdResult {
            category,
            passed: true,
            hard_failure: threshold.hard_failure,
            pass_rate: 1.0,
            pass_count: 0,
            total_count: 0,
            failure_count: 0,
            message: format!("{display}: no items to validate"),
        };
    }

    let failure_count = total.saturating_sub(passed);
    let pass_rate = passed as f64 / total as f64;

    if let Some(cap) = threshold.max_failures
        && failure_count > cap
    {
        return ThresholdResult {
            category,
            passed: false,
            hard_failure: threshold.hard_failure,
            pass_rate,
            pass_count: passed,
            total_count: total,
            failure_count,
            message: format!(
                "{display}: {failure_count} failures exceed the absolute cap of {cap}"
            ),
        };
    }

    let ok = pass_rate >= threshold.min_pass_rate;
    let message = if ok {
        format!(
            "{display}: {passed}/{total} passed ({:.1}%)",
            pass_rate * 100.0
        )
    } else {
        format!(
            "{display}: {passed}/{total} passed ({:.1}%), below the required {:.1}%",
            pass_rate * 100.0,
            threshold.min_pass_rate * 100.0
        )
    };

    ThresholdResult {
        category,
        passed: ok,
        hard_failure: threshold.hard_failure,
        pass_rate,
        pass_count: passed,
        total_count: total,
        failure_count,
        message,
    }
}

/// Partition category verdicts into hard failures, soft failures and
/// warnings; the run succeeds iff no hard failures exist.
#[must_use]
pub fn summarize_thresholds(results: &[ThresholdResult]) -> ThresholdSummary {
    let mut summary = ThresholdSummary::default();
    for result in results {
        if result.passed {
            if result.total_count > 0 && result.pass_rate < 1.0 {
                summary.warnings.push(result.category);
            }
        } else if result.hard_failure {
            summary.hard_failures.push(result.category);
        } else {
            summary.soft_failures.push(result.category);
        }
    }
    summary.success = summary.hard_failures.is_empty();
    summary
}

/// Effective per-category thresholds: registry defaults with env overrides
/// layered on top
#[must_use]
pub fn effective_thresholds(
    overrides: &BTreeMap<Category, ThresholdOverride>,
) -> BTreeMap<Category, ThresholdConfig> {
    Category::ALL
        .iter()
        .map(|cat| {
            let base = cat.spec().default_threshold;
            let effective = overrides
                .get(cat)
                .map_or(base, |over| over.apply(base));
            (*cat, effective)
        })
        .collect()
}

/// Parse one `THRESHOLD_<CATEGORY>_*` override triple from the environment.
///
/// Invalid entries (non-numeric, rate outside [0, 1]) are ignored with a
/// warning so a typo'd override falls back to the default instead of
/// silently tightening or loosening the gate.
#[must_use]
pub fn override_from_env(category: Category) -> ThresholdOverride {
    let key = category.env_key();
    let mut over = ThresholdOverride::default();

    if let Ok(raw) = std::env::var(format!("THRESHOLD_{key}_MIN_PASS_RATE")) {
        match raw.parse::<f64>() {
            Ok(rate) if (0.0..=1.0).contains(&rate) => over.min_pass_rate = Some(rate),
            _ => warn!("ignoring invalid THRESHOLD_{key}_MIN_PASS_RATE='{raw}'"),
        }
    }
    if let Ok(raw) = std::env::var(format!("THRESHOLD_{key}_MAX_FAILURES")) {
        match raw.parse::<usize>() {
            Ok(cap) => over.max_failures = Some(cap),
            Err(_) => warn!("ignoring invalid THRESHOLD_{key}_MAX_FAILURES='{raw}'"),
        }
    }
    if let Ok(raw) = std::env::var(format!("THRESHOLD_{key}_HARD_FAILURE")) {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => over.hard_failure = Some(true),
            "false" | "0" | "no" => over.hard_failure = Some(false),
            _ => warn!("ignoring invalid THRESHOLD_{key}_HARD_FAILURE='{raw}'"),
        }
    }

    over
}
