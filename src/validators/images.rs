//! Image availability validation
//!
//! HEAD request per sampled CDN URL — no body download, so probing a
//! hundred card scans costs a few kilobytes of headers. A URL passes when
//! it answers 2xx with an `image/*` content type.

use log::debug;
use reqwest::Client;

use super::{CategoryOutcome, ValidationResult, run_batched};
use crate::config::ValidationConfig;
use crate::sampler::UrlSample;

pub async fn validate_images(
    client: &Client,
    samples: &[UrlSample],
    config: &ValidationConfig,
) -> CategoryOutcome {
    let results = run_batched(samples.to_vec(), config.concurrency, |sample| {
        let client = client.clone();
        async move {
            let url = sample.url;
            match client.head(&url).timeout(config.timeout()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let content_type = response
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    debug!("HEAD {url} -> {status} ({content_type})");

                    if !response.status().is_success() {
                        ValidationResult::fail(&url, format!("HTTP {status}"))
                            .with_status_code(status)
                    } else if !content_type.starts_with("image/") {
                        ValidationResult::fail(
                            &url,
                            format!("content-type '{content_type}' is not an image"),
                        )
                        .with_status_code(status)
                    } else {
                        ValidationResult::pass(&url).with_status_code(status)
                    }
                }
                Err(err) => ValidationResult::error(&url, err.to_string()),
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}
