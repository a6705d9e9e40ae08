//! SEO tag validation
//!
//! Title and meta-description length bounds, a canonical link and an
//! `og:title` on every sampled page. Search snippets are the main way
//! players land on card pages, so this category is hard by default.

use reqwest::Client;

use super::markup::{
    check_canonical, check_meta_description, check_og_title, check_title, fetch_markup,
};
use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::RetryOptions;
use crate::sampler::UrlSample;

pub async fn validate_seo(
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
                        check_title(&html),
                        check_meta_description(&html),
                        check_canonical(&html),
                        check_og_title(&html),
                    ],
                ),
                Err(result) => *result,
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}
