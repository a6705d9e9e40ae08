//! JS bundle integrity
//!
//! Bundle filenames are fingerprinted per build, so the authoritative
//! list is whatever the shipped HTML references. This validator collects
//! script and stylesheet URLs from each locale's home page and fetches
//! every unique asset; a referenced-but-missing bundle means the deploy
//! was partial and the site will render without code or styles.

use std::collections::BTreeSet;

use log::debug;
use reqwest::Client;

use super::markup::{extract_asset_urls, fetch_markup};
use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::{RetryOptions, fetch_with_retry};
use crate::sampler::SUPPORTED_LOCALES;

/// Expected content type by extension; other assets only need a 2xx
fn content_type_matches(path: &str, content_type: &str) -> bool {
    if path.ends_with(".js") || path.ends_with(".mjs") {
        content_type.contains("javascript") || content_type.contains("ecmascript")
    } else if path.ends_with(".css") {
        content_type.contains("css")
    } else {
        true
    }
}

pub async fn validate_bundles(client: &Client, config: &ValidationConfig) -> CategoryOutcome {
    let retry = RetryOptions::default();

    // Collect asset references from every locale's entry page
    let homes: Vec<String> = SUPPORTED_LOCALES
        .iter()
        .map(|locale| format!("/{locale}/"))
        .collect();
    let fetched = run_batched(homes, config.concurrency, |path| {
        let client = client.clone();
        let retry = retry.clone();
        async move {
            let url = join_url(&config.base_url, &path);
            fetch_markup(&client, &url, config.timeout(), &retry).await
        }
    })
    .await;

    let mut results = Vec::new();
    let mut assets = BTreeSet::new();
    for markup in fetched {
        match markup {
            Ok(html) => assets.extend(extract_asset_urls(&html)),
            Err(result) => results.push(*result),
        }
    }
    debug!("bundle integrity: {} unique assets referenced", assets.len());

    let probed = run_batched(
        assets.into_iter().collect::<Vec<_>>(),
        config.concurrency,
        |asset| {
            let client = client.clone();
            let retry = retry.clone();
            async move {
                let url = join_url(&config.base_url, &asset);
                match fetch_with_retry(&client, &url, config.timeout(), &retry).await {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        if !response.status().is_success() {
                            return ValidationResult::fail(&url, format!("HTTP {status}"))
                                .with_status_code(status);
                        }
                        let content_type = response
                            .headers()
                            .get("content-type")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        let body = match response.bytes().await {
                            Ok(body) => body,
                            Err(err) => {
                                return ValidationResult::error(
                                    &url,
                                    format!("failed to read body: {err}"),
                                );
                            }
                        };
                        if body.is_empty() {
                            ValidationResult::fail(&url, "bundle body is empty")
                                .with_status_code(status)
                        } else if !content_type_matches(&asset, &content_type) {
                            ValidationResult::fail(
                                &url,
                                format!("unexpected content-type '{content_type}'"),
                            )
                            .with_status_code(status)
                        } else {
                            ValidationResult::pass(&url).with_status_code(status)
                        }
                    }
                    Err(err) => ValidationResult::error(&url, err.to_string()),
                }
            }
        },
    )
    .await;
    results.extend(probed);

    CategoryOutcome::from_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_expectations_follow_the_extension() {
        assert!(content_type_matches("/assets/app-9b1c.js", "text/javascript; charset=utf-8"));
        assert!(!content_type_matches("/assets/app-9b1c.js", "text/html"));
        assert!(content_type_matches("/assets/site.css", "text/css"));
        assert!(content_type_matches("/fonts/inter.woff2", "font/woff2"));
    }
}
