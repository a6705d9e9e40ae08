//! HTML sanity validation
//!
//! Fetches each sampled page's raw markup and runs the structural battery:
//! doctype, exactly one top-level heading, no skipped heading levels, a
//! `lang` attribute on the root element, and a main landmark. A page fails
//! the category if any sub-check fails; the failing check names are
//! surfaced for diagnosis.

use reqwest::Client;

use super::markup::{
    check_doctype, check_heading_order, check_lang_attribute, check_main_landmark,
    check_single_h1, fetch_markup,
};
use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::RetryOptions;
use crate::sampler::UrlSample;

pub async fn validate_html(
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
            match fetch_markup(&client, &url, config.timeout(), &retry).await {
                Ok(html) => ValidationResult::from_checks(
                    &url,
                    vec![
                        check_doctype(&html),
                        check_single_h1(&html),
                        check_heading_order(&html),
                        check_lang_attribute(&html),
                        check_main_landmark(&html),
                    ],
                ),
                Err(result) => *result,
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}
