//! Page reachability validation
//!
//! GETs every sampled page through the retry engine with bounded batch
//! concurrency. A page passes when it answers 2xx within the configured
//! response-time ceiling; a wrong status is a `fail`, an exhausted retry
//! (timeout, network) is an `error`.

use std::time::Instant;

use log::debug;
use reqwest::Client;

use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::{RetryOptions, fetch_with_retry};
use crate::sampler::UrlSample;

pub async fn validate_pages(
    client: &Client,
    samples: &[UrlSample],
    config: &ValidationConfig,
) -> CategoryOutcome {
    let retry = RetryOptions::default();

    let results = run_batched(samples.to_vec(), config.concurrency, |sample| {
        let client = client.clone();
        let retry = retry.clone();
        async move {
            let url = join_url(&config.base_url, &sample.url);
            let started = Instant::now();

            match fetch_with_retry(&client, &url, config.timeout(), &retry).await {
                Ok(response) => {
                    let elapsed = started.elapsed().as_millis() as u64;
                    let status = response.status().as_u16();
                    debug!("GET {url} -> {status} in {elapsed}ms");

                    if !response.status().is_success() {
                        ValidationResult::fail(&url, format!("HTTP {status}"))
                            .with_status_code(status)
                            .with_response_time(elapsed)
                    } else if elapsed > config.max_response_time_ms {
                        ValidationResult::fail(
                            &url,
                            format!(
                                "responded in {elapsed}ms, ceiling is {}ms",
                                config.max_response_time_ms
                            ),
                        )
                        .with_status_code(status)
                        .with_response_time(elapsed)
                    } else {
                        ValidationResult::pass(&url)
                            .with_status_code(status)
                            .with_response_time(elapsed)
                    }
                }
                Err(err) => ValidationResult::error(&url, err.to_string()),
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}
