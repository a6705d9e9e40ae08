//! API/data endpoint validation
//!
//! GETs the fixed well-known endpoints the site's client code depends on
//! and asserts status, content type and body shape. These are build
//! artifacts, not dynamic APIs — if one is missing the export step was
//! skipped or the upload was partial.

use log::debug;
use reqwest::Client;

use super::{CategoryOutcome, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::retry::{RetryOptions, fetch_with_retry};

#[derive(Debug, Clone, Copy)]
enum EndpointKind {
    CardsDataset,
    VersionDescriptor,
    Sitemap,
    Robots,
}

/// The well-known endpoints probed every run
const ENDPOINTS: &[(&str, EndpointKind)] = &[
    ("/data/cards.json", EndpointKind::CardsDataset),
    ("/data/version.json", EndpointKind::VersionDescriptor),
    ("/sitemap.xml", EndpointKind::Sitemap),
    ("/robots.txt", EndpointKind::Robots),
];

/// Body-shape assertion per endpoint kind; `Err` carries the violated
/// condition
fn check_body(kind: EndpointKind, body: &str) -> Result<(), String> {
    match kind {
        EndpointKind::CardsDataset => {
            let value: serde_json::Value = serde_json::from_str(body)
                .map_err(|err| format!("not valid JSON: {err}"))?;
            match value.get("cards").and_then(|cards| cards.as_object()) {
                Some(cards) if !cards.is_empty() => Ok(()),
                Some(_) => Err("'cards' object is empty".to_string()),
                None => Err("missing 'cards' object".to_string()),
            }
        }
        EndpointKind::VersionDescriptor => {
            let value: serde_json::Value = serde_json::from_str(body)
                .map_err(|err| format!("not valid JSON: {err}"))?;
            match value.get("version").and_then(|version| version.as_str()) {
                Some(version) if !version.is_empty() => Ok(()),
                _ => Err("missing or empty 'version' field".to_string()),
            }
        }
        EndpointKind::Sitemap => {
            if body.contains("<urlset") || body.contains("<sitemapindex") {
                Ok(())
            } else {
                Err("no <urlset> or <sitemapindex> element".to_string())
            }
        }
        EndpointKind::Robots => {
            if body.trim().is_empty() {
                Err("robots.txt is empty".to_string())
            } else {
                Ok(())
            }
        }
    }
}

pub async fn validate_endpoints(client: &Client, config: &ValidationConfig) -> CategoryOutcome {
    let retry = RetryOptions::default();

    let results = run_batched(ENDPOINTS.to_vec(), config.concurrency, |(path, kind)| {
        let client = client.clone();
        let retry = retry.clone();
        async move {
            let url = join_url(&config.base_url, path);
            match fetch_with_retry(&client, &url, config.timeout(), &retry).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    debug!("GET {url} -> {status}");
                    if !response.status().is_success() {
                        return ValidationResult::fail(&url, format!("HTTP {status}"))
                            .with_status_code(status);
                    }
                    let body = match response.text().await {
                        Ok(text) => text,
                        Err(err) => {
                            return ValidationResult::error(
                                &url,
                                format!("failed to read body: {err}"),
                            );
                        }
                    };
                    match check_body(kind, &body) {
                        Ok(()) => ValidationResult::pass(&url).with_status_code(status),
                        Err(reason) => {
                            ValidationResult::fail(&url, reason).with_status_code(status)
                        }
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
    fn cards_dataset_requires_a_non_empty_map() {
        assert!(check_body(EndpointKind::CardsDataset, r#"{"cards":{"a":{}}}"#).is_ok());
        assert!(check_body(EndpointKind::CardsDataset, r#"{"cards":{}}"#).is_err());
        assert!(check_body(EndpointKind::CardsDataset, r#"{"decks":{}}"#).is_err());
        assert!(check_body(EndpointKind::CardsDataset, "not json").is_err());
    }

    #[test]
    fn version_descriptor_requires_a_version_string() {
        assert!(check_body(EndpointKind::VersionDescriptor, r#"{"version":"2026.08.01"}"#).is_ok());
        assert!(check_body(EndpointKind::VersionDescriptor, r#"{"version":""}"#).is_err());
    }

    #[test]
    fn sitemap_accepts_index_files() {
        assert!(check_body(EndpointKind::Sitemap, "<sitemapindex></sitemapindex>").is_ok());
        assert!(check_body(EndpointKind::Sitemap, "<html></html>").is_err());
    }
}
