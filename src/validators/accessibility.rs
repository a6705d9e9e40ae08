//! Accessibility heuristics
//!
//! Pattern-level checks that catch the regressions a template change
//! actually causes: images losing alt text, icon buttons losing their
//! labels, form controls detaching from their labels, the skip link
//! disappearing. Not a substitute for a real audit, which is why the
//! category is soft by default.

use reqwest::Client;

use super::markup::{
    check_form_labels, check_image_alts, check_interactive_labels, check_skip_link_or_nav,
    fetch_markup,
};
use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::RetryOptions;
use crate::sampler::UrlSample;

pub async fn validate_accessibility(
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
                        check_image_alts(&html),
                        check_interactive_labels(&html),
                        check_form_labels(&html),
                        check_skip_link_or_nav(&html),
                    ],
                ),
                Err(result) => *result,
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}
