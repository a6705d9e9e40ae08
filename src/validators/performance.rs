//! Performance validation
//!
//! Fetches a stratified one-per-category subset plus a few extra card
//! pages WITHOUT retry, so each measured latency reflects a single real
//! attempt. Hard-fails on pages over the response-time or payload
//! ceilings; flags pages over the warn ceiling as slow-but-passed.

use std::time::Instant;

use log::debug;
use reqwest::Client;

use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::sampler::{SampleCategory, SampleSet, UrlSample};

/// Extra card pages measured beyond the one-per-category subset
const EXTRA_CARD_SAMPLES: usize = 3;

/// Summary statistics over observed response times
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfStats {
    pub min_ms: u64,
    pub max_ms: u64,
    pub avg_ms: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

/// Nearest-rank percentile over a sorted sample
fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

impl PerfStats {
    #[must_use]
    fn from_times(mut times: Vec<u64>) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        times.sort_unstable();
        let sum: u64 = times.iter().sum();
        Some(Self {
            min_ms: times[0],
            max_ms: times[times.len() - 1],
            avg_ms: sum / times.len() as u64,
            p50_ms: percentile(&times, 50.0),
            p95_ms: percentile(&times, 95.0),
            p99_ms: percentile(&times, 99.0),
        })
    }
}

/// One page per category, plus a few extra card pages for depth
fn measurement_subset(samples: &SampleSet) -> Vec<UrlSample> {
    let mut subset = Vec::new();
    for category in [
        SampleCategory::List,
        SampleCategory::Blog,
        SampleCategory::Static,
        SampleCategory::Card,
    ] {
        if let Some(sample) = samples.pages_in(category).first() {
            subset.push((*sample).clone());
        }
    }
    let extra_cards: Vec<UrlSample> = samples
        .pages_in(SampleCategory::Card)
        .into_iter()
        .skip(1)
        .take(EXTRA_CARD_SAMPLES)
        .cloned()
        .collect();
    subset.extend(extra_cards);
    subset
}

pub async fn validate_performance(
    client: &Client,
    samples: &SampleSet,
    config: &ValidationConfig,
) -> (CategoryOutcome, Option<PerfStats>) {
    let subset = measurement_subset(samples);

    let results = run_batched(subset, config.concurrency, |sample| {
        let client = client.clone();
        async move {
            let url = join_url(&config.base_url, &sample.url);
            let started = Instant::now();

            // Single attempt, no retry: a retried measurement is a lie
            let response = match client.get(&url).timeout(config.timeout()).send().await {
                Ok(response) => response,
                Err(err) => return ValidationResult::error(&url, err.to_string()),
            };
            let status = response.status().as_u16();
            let declared_length = response.content_length();
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    return ValidationResult::error(&url, format!("failed to read body: {err}"));
                }
            };
            let elapsed = started.elapsed().as_millis() as u64;
            let payload = declared_length.unwrap_or(body.len() as u64);
            debug!("GET {url} -> {status}, {payload} bytes in {elapsed}ms");

            let mut result = if status >= 400 {
                ValidationResult::fail(&url, format!("HTTP {status}"))
            } else if elapsed > config.max_response_time_ms {
                ValidationResult::fail(
                    &url,
                    format!(
                        "responded in {elapsed}ms, ceiling is {}ms",
                        config.max_response_time_ms
                    ),
                )
            } else if payload > config.max_payload_bytes {
                ValidationResult::fail(
                    &url,
                    format!(
                        "payload is {payload} bytes, ceiling is {}",
                        config.max_payload_bytes
                    ),
                )
            } else if elapsed > config.warn_response_time_ms {
                let mut slow = ValidationResult::pass(&url)
                    .with_warning(format!("slow: {elapsed}ms over the {}ms warn ceiling",
                        config.warn_response_time_ms));
                slow.slow = true;
                slow
            } else {
                ValidationResult::pass(&url)
            };
            result.status_code = Some(status);
            result.response_time_ms = Some(elapsed);
            result.payload_bytes = Some(payload);
            result
        }
    })
    .await;

    let times: Vec<u64> = results
        .iter()
        .filter_map(|result| result.response_time_ms)
        .collect();
    let stats = PerfStats::from_times(times);

    (CategoryOutcome::from_results(results), stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentiles_over_a_known_sample() {
        let times: Vec<u64> = (1..=100).collect();
        let stats = PerfStats::from_times(times).unwrap();
        assert_eq!(stats.min_ms, 1);
        assert_eq!(stats.max_ms, 100);
        assert_eq!(stats.p50_ms, 50);
        assert_eq!(stats.p95_ms, 95);
        assert_eq!(stats.p99_ms, 99);
        assert_eq!(stats.avg_ms, 50);
    }

    #[test]
    fn empty_sample_has_no_stats() {
        assert!(PerfStats::from_times(Vec::new()).is_none());
    }

    #[test]
    fn single_observation_is_every_percentile() {
        let stats = PerfStats::from_times(vec![120]).unwrap();
        assert_eq!(stats.p50_ms, 120);
        assert_eq!(stats.p99_ms, 120);
    }
}
