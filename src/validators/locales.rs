//! Locale redirect validation
//!
//! The site serves every page under a locale prefix; unprefixed paths are
//! expected to redirect to the visitor's negotiated locale. This validator
//! GETs a small fixed set of unprefixed paths (following redirects) and
//! checks that each lands on a locale-prefixed URL on the same host.

use log::debug;
use reqwest::Client;
use url::Url;

use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::sampler::SUPPORTED_LOCALES;

/// Unprefixed entry points that must negotiate a locale
const PROBE_PATHS: &[&str] = &["/", "/cards"];

fn has_locale_prefix(path: &str) -> bool {
    SUPPORTED_LOCALES.iter().any(|locale| {
        path == format!("/{locale}") || path.starts_with(&format!("/{locale}/"))
    })
}

pub async fn validate_locale_redirects(
    client: &Client,
    config: &ValidationConfig,
) -> CategoryOutcome {
    let base_host = Url::parse(&config.base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));

    let paths: Vec<&str> = PROBE_PATHS.to_vec();
    let results = run_batched(paths, config.concurrency, |path| {
        let client = client.clone();
        let base_host = base_host.clone();
        async move {
            let url = join_url(&config.base_url, path);
            match client.get(&url).timeout(config.timeout()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let final_url = response.url().clone();
                    let final_path = final_url.path().to_string();
                    debug!("GET {url} -> {status} at {final_url}");

                    if !response.status().is_success() {
                        ValidationResult::fail(&url, format!("HTTP {status}"))
                            .with_status_code(status)
                    } else if base_host.is_some()
                        && final_url.host_str().map(str::to_string) != base_host
                    {
                        ValidationResult::fail(
                            &url,
                            format!("redirected off-site to {final_url}"),
                        )
                        .with_status_code(status)
                    } else if has_locale_prefix(&final_path) {
                        ValidationResult::pass(&url).with_status_code(status)
                    } else {
                        ValidationResult::fail(
                            &url,
                            format!("landed on '{final_path}' without a locale prefix"),
                        )
                        .with_status_code(status)
                    }
                }
                Err(err) => ValidationResult::error(&url, err.to_string()),
            }
        }
    })
    .await;

    CategoryOutcome::from_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_prefix_detection() {
        assert!(has_locale_prefix("/en/"));
        assert!(has_locale_prefix("/ja/cards/ogn-001"));
        assert!(has_locale_prefix("/de"));
        assert!(!has_locale_prefix("/"));
        assert!(!has_locale_prefix("/cards"));
        assert!(!has_locale_prefix("/enx/cards"));
    }
}
