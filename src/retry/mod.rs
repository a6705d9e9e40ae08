//! Retry engine for fallible asynchronous operations
//!
//! Generic retry-with-backoff around a caller-supplied operation, plus a
//! `fetch_with_retry` convenience wrapping a single HTTP GET. The engine
//! never guesses at retryability: the caller's classifier decides, and
//! fatal errors short-circuit immediately with no wasted delay.
//!
//! Backoff is exponential with up to 30% uniform jitter, clamped at
//! `max_delay_ms`, to keep a fleet of CI runners from retrying in lockstep.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use rand::Rng;
use reqwest::Client;

/// Fraction of the base delay added as random jitter, exclusive upper bound
const JITTER_FACTOR: f64 = 0.3;

/// Error message substrings treated as transient network conditions
const TRANSIENT_ERROR_MARKERS: &[&str] = &[
    "connection reset",
    "connection closed",
    "timed out",
    "error sending request",
    "dns error",
];

/// Options controlling retry count and backoff shape
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// HTTP statuses worth retrying (server hiccups, rate limiting)
    pub retryable_statuses: Vec<u16>,
    pub retry_on_timeout: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            retry_on_timeout: true,
        }
    }
}

/// Outcome of a retried operation, with one error entry per failed attempt
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub success: bool,
    pub result: Option<T>,
    pub attempts: u32,
    pub errors: Vec<String>,
}

/// Backoff delay for the given 1-based attempt, without jitter.
///
/// `delay(n) = min(base * 2^(n-1), max)` — monotonically non-decreasing
/// until clamped.
#[must_use]
pub fn backoff_delay_ms(attempt: u32, options: &RetryOptions) -> u64 {
    let exponent = attempt.saturating_sub(1).min(32);
    let unclamped = options
        .base_delay_ms
        .saturating_mul(1u64.checked_shl(exponent).unwrap_or(u64::MAX));
    unclamped.min(options.max_delay_ms)
}

/// Backoff delay with uniform jitter in [0, 30%) applied before clamping
#[must_use]
pub fn backoff_delay_with_jitter(attempt: u32, options: &RetryOptions) -> Duration {
    let base = backoff_delay_ms(attempt, options) as f64;
    let jitter = rand::rng().random_range(0.0..JITTER_FACTOR);
    let jittered = (base * (1.0 + jitter)).min(options.max_delay_ms as f64);
    Duration::from_millis(jittered as u64)
}

/// Run `operation` up to `max_attempts` times with exponential backoff.
///
/// `is_retryable` classifies each failure; a non-retryable error stops the
/// loop immediately. All attempt errors are accumulated in the outcome so
/// the caller can report the full history.
pub async fn with_retry<T, E, F, Fut, C>(
    mut operation: F,
    is_retryable: C,
    options: &RetryOptions,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    C: Fn(&E) -> bool,
{
    let mut errors = Vec::new();

    for attempt in 1..=options.max_attempts.max(1) {
        match operation().await {
            Ok(value) => {
                return RetryOutcome {
                    success: true,
                    result: Some(value),
                    attempts: attempt,
                    errors,
                };
            }
            Err(err) => {
                let retryable = is_retryable(&err);
                errors.push(format!("attempt {attempt}: {err}"));

                if attempt < options.max_attempts && retryable {
                    let delay = backoff_delay_with_jitter(attempt, options);
                    debug!("attempt {attempt} failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                } else {
                    if !retryable {
                        debug!("attempt {attempt} failed with non-retryable error: {err}");
                    }
                    return RetryOutcome {
                        success: false,
                        result: None,
                        attempts: attempt,
                        errors,
                    };
                }
            }
        }
    }

    RetryOutcome {
        success: false,
        result: None,
        attempts: options.max_attempts.max(1),
        errors,
    }
}

/// Failure of a single fetch attempt: either a retryable-status response
/// or a transport-level error
enum FetchAttemptError {
    Status(u16),
    Transport(reqwest::Error),
}

impl Display for FetchAttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchAttemptError::Status(code) => write!(f, "HTTP {code}"),
            FetchAttemptError::Transport(err) => write!(f, "{err}"),
        }
    }
}

/// True if a transport error looks like a transient network condition
fn is_transient_transport(err: &reqwest::Error, retry_on_timeout: bool) -> bool {
    if err.is_timeout() {
        return retry_on_timeout;
    }
    if err.is_connect() {
        return true;
    }
    let text = err.to_string().to_lowercase();
    TRANSIENT_ERROR_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// GET `url` with a per-attempt timeout, retrying on configured statuses,
/// timeouts and transient network failures.
///
/// A response with a non-retryable status (404, 403, ...) is returned to
/// the caller as-is — deciding whether that status is a validation failure
/// is the validator's job, not the transport layer's.
///
/// # Errors
///
/// Returns an error naming every attempt's failure once retries are
/// exhausted or a fatal transport error occurs.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    timeout: Duration,
    options: &RetryOptions,
) -> Result<reqwest::Response> {
    let outcome = with_retry(
        || async move {
            let response = client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(FetchAttemptError::Transport)?;

            let status = response.status().as_u16();
            if options.retryable_statuses.contains(&status) {
                return Err(FetchAttemptError::Status(status));
            }
            Ok(response)
        },
        |err| match err {
            FetchAttemptError::Status(_) => true,
            FetchAttemptError::Transport(e) => is_transient_transport(e, options.retry_on_timeout),
        },
        options,
    )
    .await;

    match outcome.result {
        Some(response) => Ok(response),
        None => {
            warn!(
                "fetch of {url} failed after {} attempt(s)",
                outcome.attempts
            );
            Err(anyhow!(
                "fetch of {url} failed after {} attempt(s): {}",
                outcome.attempts,
                outcome.errors.join("; ")
            ))
        }
    }
}
