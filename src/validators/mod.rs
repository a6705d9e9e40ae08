//! Category validators
//!
//! Each validator is independent and stateless: it consumes the run's
//! sample set (or a derived subset), probes the deployment over HTTP, and
//! produces a uniform `CategoryOutcome`. Any subset of validators may be
//! skipped without affecting the others; new categories are added by
//! writing a new module, registering one row in `registry::REGISTRY`, and
//! wiring one orchestrator phase.
//!
//! Shared vocabulary:
//! - `Fail` means the target responded but violated a checked condition
//! - `Error` means no verdict could be obtained (timeout, network, parse)
//!
//! The two are never collapsed; a timeout must stay distinguishable from
//! a wrong status code all the way into the report.

pub mod accessibility;
pub mod bundles;
pub mod deltas;
pub mod endpoints;
pub mod error_pages;
pub mod html;
pub mod images;
pub mod links;
pub mod locales;
pub mod markup;
pub mod pages;
pub mod patch;
pub mod performance;
pub mod seo;

use std::future::Future;

use futures::future::join_all;

/// Verdict for one probed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Pass,
    /// The operation completed but violated a checked condition
    Fail,
    /// The operation itself could not complete
    Error,
}

/// How an invalid path signalled "not found"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundMode {
    /// A true HTTP 404 status
    Server,
    /// A 200 page whose body carries recognizable not-found markers
    Client,
    /// Neither — the error page is broken
    None,
}

/// One named sub-check inside a markup validator
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    /// Occurrence count where it aids diagnosis (e.g. images missing alt)
    pub count: Option<usize>,
    pub detail: Option<String>,
}

impl CheckOutcome {
    #[must_use]
    pub fn pass(name: &'static str) -> Self {
        Self {
            name,
            passed: true,
            count: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            count: None,
            detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Uniform per-item result record shared by every validator
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub url: String,
    pub status: ValidationStatus,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub response_time_ms: Option<u64>,
    /// Named sub-checks, populated by the markup validators
    pub checks: Vec<CheckOutcome>,
    /// Payload size, populated by the performance validator
    pub payload_bytes: Option<u64>,
    /// Passed but exceeded the warn ceiling (performance)
    pub slow: bool,
    /// Notable but non-failing condition (absent manifest, slow page)
    pub warning: Option<String>,
    /// How a deliberately-invalid path signalled not-found (error pages)
    pub not_found_mode: Option<NotFoundMode>,
}

impl ValidationResult {
    #[must_use]
    pub fn pass(url: impl Into<String>) -> Self {
        Self::new(url.into(), ValidationStatus::Pass)
    }

    #[must_use]
    pub fn fail(url: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::new(url.into(), ValidationStatus::Fail);
        result.error = Some(reason.into());
        result
    }

    #[must_use]
    pub fn error(url: impl Into<String>, cause: impl Into<String>) -> Self {
        let mut result = Self::new(url.into(), ValidationStatus::Error);
        result.error = Some(cause.into());
        result
    }

    fn new(url: String, status: ValidationStatus) -> Self {
        Self {
            url,
            status,
            status_code: None,
            error: None,
            response_time_ms: None,
            checks: Vec::new(),
            payload_bytes: None,
            slow: false,
            warning: None,
            not_found_mode: None,
        }
    }

    #[must_use]
    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    #[must_use]
    pub fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn with_checks(mut self, checks: Vec<CheckOutcome>) -> Self {
        self.checks = checks;
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Collapse a sub-check battery into one per-page result; the failing
    /// check names are surfaced for diagnosis
    #[must_use]
    pub fn from_checks(url: impl Into<String>, checks: Vec<CheckOutcome>) -> Self {
        let failing: Vec<&str> = checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name)
            .collect();
        if failing.is_empty() {
            Self::pass(url).with_checks(checks)
        } else {
            Self::fail(url, format!("failed checks: {}", failing.join(", "))).with_checks(checks)
        }
    }
}

/// Per-category aggregate, derived once from the result list
#[derive(Debug, Clone, Default)]
pub struct CategoryOutcome {
    pub passed: usize,
    pub failed: usize,
    pub warned: usize,
    pub results: Vec<ValidationResult>,
}

impl CategoryOutcome {
    /// Sum a result list into counts; `Error` counts as failed, and a
    /// passing result with a warning or slow flag counts as warned.
    #[must_use]
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let passed = results
            .iter()
            .filter(|r| r.status == ValidationStatus::Pass)
            .count();
        let failed = results.len() - passed;
        let warned = results
            .iter()
            .filter(|r| r.status == ValidationStatus::Pass && (r.warning.is_some() || r.slow))
            .count();
        Self {
            passed,
            failed,
            warned,
            results,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Resolve a site-relative path against the target base URL; absolute
/// URLs (CDN images) pass through untouched.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Process `items` through `op` in fixed-size concurrent batches.
///
/// Results come back in submission order regardless of completion order,
/// and batch N+1 never starts before batch N fully resolves — bounding
/// peak outbound concurrency without a shared semaphore.
pub async fn run_batched<T, R, F, Fut>(items: Vec<T>, concurrency: usize, op: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let width = concurrency.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();

    loop {
        let batch: Vec<T> = iter.by_ref().take(width).collect();
        if batch.is_empty() {
            break;
        }
        // join_all preserves input order within the batch
        results.extend(join_all(batch.into_iter().map(&op)).await);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_counts_error_as_failed() {
        let outcome = CategoryOutcome::from_results(vec![
            ValidationResult::pass("/a"),
            ValidationResult::fail("/b", "wrong status"),
            ValidationResult::error("/c", "timeout"),
        ]);
        assert_eq!(outcome.passed, 1);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn warned_requires_a_passing_result() {
        let outcome = CategoryOutcome::from_results(vec![
            ValidationResult::pass("/a").with_warning("slow"),
            ValidationResult::fail("/b", "bad").with_warning("also slow"),
        ]);
        assert_eq!(outcome.warned, 1);
    }

    #[tokio::test]
    async fn batches_preserve_submission_order() {
        // Later items resolve sooner; order must still match the input
        let items = vec![40u64, 30, 20, 10];
        let results = run_batched(items, 2, |delay| async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            delay
        })
        .await;
        assert_eq!(results, vec![40, 30, 20, 10]);
    }
}
