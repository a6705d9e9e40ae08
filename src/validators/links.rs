//! Internal link integrity
//!
//! Extracts site-relative hrefs from every sampled page's markup and
//! verifies each unique target. A link resolves if it is already in the
//! run's known URL set; anything outside the sample is HEAD-probed once
//! (deduplicated across pages) so a small sample doesn't flag the rest of
//! the site as broken.

use std::collections::BTreeMap;

use log::debug;
use reqwest::Client;

use super::markup::{extract_internal_links, fetch_markup};
use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::RetryOptions;
use crate::sampler::SampleSet;

pub async fn validate_links(
    client: &Client,
    samples: &SampleSet,
    config: &ValidationConfig,
) -> CategoryOutcome {
    let retry = RetryOptions::default();
    let known = samples.known_paths();

    // Phase 1: collect every internal link, remembering where it was first seen
    let fetched = run_batched(samples.pages.clone(), config.concurrency, |sample| {
        let client = client.clone();
        let retry = retry.clone();
        async move {
            let url = join_url(&config.base_url, &sample.url);
            let markup = fetch_markup(&client, &url, config.timeout(), &retry).await;
            (sample, markup)
        }
    })
    .await;

    let mut results = Vec::new();
    let mut sources: BTreeMap<String, String> = BTreeMap::new();
    for (sample, markup) in fetched {
        match markup {
            Ok(html) => {
                for link in extract_internal_links(&html) {
                    sources.entry(link).or_insert_with(|| sample.url.clone());
                }
            }
            // A page that can't be fetched can't vouch for its links
            Err(result) => results.push(*result),
        }
    }

    // Phase 2: resolve each unique target — membership first, probe second
    let mut to_probe = Vec::new();
    for (link, source) in sources {
        if known.contains(&link) || known.contains(&format!("{link}/")) {
            results.push(ValidationResult::pass(&link));
        } else {
            to_probe.push((link, source));
        }
    }
    debug!(
        "link integrity: {} resolved in-sample, {} need probing",
        results.len(),
        to_probe.len()
    );

    let probed = run_batched(to_probe, config.concurrency, |(link, source)| {
        let client = client.clone();
        async move {
            let url = join_url(&config.base_url, &link);
            match client.head(&url).timeout(config.timeout()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if status == 404 {
                        ValidationResult::fail(
                            &link,
                            format!("broken internal link (HTTP 404), first seen on {source}"),
                        )
                        .with_status_code(status)
                    } else {
                        ValidationResult::pass(&link).with_status_code(status)
                    }
                }
                Err(err) => ValidationResult::error(&link, err.to_string()),
            }
        }
    })
    .await;
    results.extend(probed);

    CategoryOutcome::from_results(results)
}
