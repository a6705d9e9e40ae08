//! Error-page behavior validation
//!
//! GETs deliberately-invalid paths and accepts EITHER a true server-side
//! 404 status OR a 200 page whose body carries recognizable not-found
//! markers — the latter is how a client-rendered fallback presents, and
//! both are valid. A response that is neither, or whose body is
//! implausibly short, fails.

use log::debug;
use reqwest::Client;

use super::{CategoryOutcome, NotFoundMode, ValidationResult, join_url, run_batched};
use crate::config::ValidationConfig;
use crate::sampler::SUPPORTED_LOCALES;

/// A card id that can never exist (set codes are three letters)
const BOGUS_CARD_ID: &str = "zzz-0000";

/// Body fragments that identify a client-rendered not-found page,
/// covering every supported locale
const NOT_FOUND_MARKERS: &[&str] = &[
    "not found",
    "404",
    "doesn't exist",
    "does not exist",
    "page introuvable",
    "nicht gefunden",
    "no encontrada",
    "見つかりません",
];

/// A genuine not-found page carries a layout; anything shorter is a
/// broken or empty response pretending to be one
const MIN_PLAUSIBLE_BODY_BYTES: usize = 512;

/// The fixed set of deliberately-invalid paths probed each run
#[must_use]
pub fn probe_paths() -> Vec<String> {
    let mut paths: Vec<String> = SUPPORTED_LOCALES
        .iter()
        .map(|locale| format!("/{locale}/cards/{BOGUS_CARD_ID}"))
        .collect();
    paths.push("/this-page-does-not-exist".to_string());
    paths
}

/// Classify a body as a client-rendered not-found page
fn body_reads_as_not_found(body: &str) -> bool {
    let lowered = body.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| lowered.contains(marker))
}

pub async fn validate_error_pages(client: &Client, config: &ValidationConfig) -> CategoryOutcome {
    let results = run_batched(probe_paths(), config.concurrency, |path| {
        let client = client.clone();
        async move {
            let url = join_url(&config.base_url, &path);
            match client.get(&url).timeout(config.timeout()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    debug!("GET {url} -> {status}");

                    if status == 404 {
                        let mut result = ValidationResult::pass(&url).with_status_code(status);
                        result.not_found_mode = Some(NotFoundMode::Server);
                        return result;
                    }

                    if response.status().is_success() {
                        let body = match response.text().await {
                            Ok(text) => text,
                            Err(err) => {
                                return ValidationResult::error(
                                    &url,
                                    format!("failed to read body: {err}"),
                                );
                            }
                        };
                        if body.len() < MIN_PLAUSIBLE_BODY_BYTES {
                            let mut result = ValidationResult::fail(
                                &url,
                                format!("implausibly short body ({} bytes)", body.len()),
                            )
                            .with_status_code(status);
                            result.not_found_mode = Some(NotFoundMode::None);
                            return result;
                        }
                        if body_reads_as_not_found(&body) {
                            let mut result = ValidationResult::pass(&url).with_status_code(status);
                            result.not_found_mode = Some(NotFoundMode::Client);
                            return result;
                        }
                        let mut result = ValidationResult::fail(
                            &url,
                            "invalid path served a page with no not-found markers",
                        )
                        .with_status_code(status);
                        result.not_found_mode = Some(NotFoundMode::None);
                        return result;
                    }

                    let mut result =
                        ValidationResult::fail(&url, format!("unexpected HTTP {status}"))
                            .with_status_code(status);
                    result.not_found_mode = Some(NotFoundMode::None);
                    result
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
    fn probe_paths_cover_every_locale_plus_one() {
        let paths = probe_paths();
        assert_eq!(paths.len(), SUPPORTED_LOCALES.len() + 1);
        assert!(paths.iter().any(|p| p == "/en/cards/zzz-0000"));
        assert!(paths.iter().any(|p| p == "/this-page-does-not-exist"));
    }

    #[test]
    fn marker_detection_is_case_insensitive() {
        assert!(body_reads_as_not_found("<h1>Page Not Found</h1>"));
        assert!(body_reads_as_not_found("Diese Seite wurde nicht gefunden."));
        assert!(!body_reads_as_not_found("<h1>Ironclad Vanguard</h1>"));
    }
}
