//! Delta/incremental-update integrity
//!
//! Clients keep their local card database current by applying delta files
//! named in `data/patches/manifest.json` instead of re-downloading the
//! full dataset. This validator checks the chain end to end:
//!
//! 1. manifest present and schema-valid (absent is a warning — a freshly
//!    bootstrapped deployment has no updates yet)
//! 2. a sample of referenced delta files parse and agree with their
//!    manifest entries (version pair, operation-count arithmetic)
//! 3. every operation kind is drawn from the fixed patch vocabulary
//! 4. one sampled patch actually applies to a synthetic document —
//!    semantic mismatches against synthetic data are expected; only a
//!    structural application error fails
//!
//! All external JSON is schema-checked at this boundary into typed
//! records; nothing deeper in the validator throws on shape surprises.

use std::collections::BTreeMap;

use log::{debug, info};
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::patch::{KNOWN_OPS, PatchOperation, apply_patch};
use super::{CategoryOutcome, ValidationResult, join_url};
use crate::config::ValidationConfig;
use crate::retry::{RetryOptions, fetch_with_retry};

/// Manifest location relative to the site root
const MANIFEST_PATH: &str = "/data/patches/manifest.json";

/// Delta files sampled per run
const DELTA_SAMPLE_COUNT: usize = 3;

/// The manifest as published by the data export step
#[derive(Debug, Clone, Deserialize)]
pub struct PatchManifest {
    pub current_version: String,
    #[serde(default)]
    pub deltas: Vec<DeltaEntry>,
}

/// One manifest row describing an available delta file
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaEntry {
    pub from_version: String,
    pub to_version: String,
    pub file: String,
    pub operation_count: usize,
}

/// A delta file's own header and payload
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaFile {
    pub from_version: String,
    pub to_version: String,
    pub generated_at: String,
    pub operations: Vec<PatchOperation>,
    #[serde(default)]
    pub operation_counts: BTreeMap<String, usize>,
}

/// Structural agreement between a delta file and its manifest entry
fn check_delta_against_entry(delta: &DeltaFile, entry: &DeltaEntry) -> Result<(), String> {
    if delta.from_version != entry.from_version || delta.to_version != entry.to_version {
        return Err(format!(
            "version pair {}->{} does not match manifest entry {}->{}",
            delta.from_version, delta.to_version, entry.from_version, entry.to_version
        ));
    }
    if delta.operations.len() != entry.operation_count {
        return Err(format!(
            "{} operations present, manifest declares {}",
            delta.operations.len(),
            entry.operation_count
        ));
    }
    let counted: usize = delta.operation_counts.values().sum();
    if counted != entry.operation_count {
        return Err(format!(
            "per-kind counts sum to {counted}, manifest declares {}",
            entry.operation_count
        ));
    }
    if let Some(operation) = delta
        .operations
        .iter()
        .find(|operation| !KNOWN_OPS.contains(&operation.op.as_str()))
    {
        return Err(format!("unknown operation kind '{}'", operation.op));
    }
    Ok(())
}

/// Prove one patch is at least syntactically executable. The synthetic
/// document won't contain the patch's targets, so semantic errors are
/// the expected outcome; a structural error condemns the file.
fn check_apply(delta: &DeltaFile) -> Result<(), String> {
    let mut synthetic = json!({
        "version": delta.from_version,
        "cards": {},
    });
    match apply_patch(&mut synthetic, &delta.operations) {
        Ok(()) => Ok(()),
        Err(err) if err.is_semantic() => {
            debug!("expected semantic mismatch on synthetic data: {err}");
            Ok(())
        }
        Err(err) => Err(format!("patch is not executable: {err}")),
    }
}

pub async fn validate_deltas(client: &Client, config: &ValidationConfig) -> CategoryOutcome {
    let retry = RetryOptions::default();
    let manifest_url = join_url(&config.base_url, MANIFEST_PATH);

    let response = match fetch_with_retry(client, &manifest_url, config.timeout(), &retry).await {
        Ok(response) => response,
        Err(err) => {
            return CategoryOutcome::from_results(vec![ValidationResult::error(
                &manifest_url,
                err.to_string(),
            )]);
        }
    };

    let status = response.status().as_u16();
    if status == 404 {
        // Valid for a deployment that has never shipped an update
        info!("no delta manifest published yet at {manifest_url}");
        return CategoryOutcome::from_results(vec![
            ValidationResult::pass(&manifest_url)
                .with_status_code(status)
                .with_warning("manifest not found — no incremental updates published yet"),
        ]);
    }
    if !response.status().is_success() {
        return CategoryOutcome::from_results(vec![
            ValidationResult::fail(&manifest_url, format!("HTTP {status}")).with_status_code(status),
        ]);
    }

    let body = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            return CategoryOutcome::from_results(vec![ValidationResult::error(
                &manifest_url,
                format!("failed to read body: {err}"),
            )]);
        }
    };
    let manifest: PatchManifest = match serde_json::from_str(&body) {
        Ok(manifest) => manifest,
        Err(err) => {
            return CategoryOutcome::from_results(vec![
                ValidationResult::fail(&manifest_url, format!("manifest failed schema check: {err}"))
                    .with_status_code(status),
            ]);
        }
    };

    let mut results = Vec::new();
    if manifest.current_version.is_empty() {
        results.push(
            ValidationResult::fail(&manifest_url, "manifest has an empty current_version")
                .with_status_code(status),
        );
    } else if manifest.deltas.is_empty() {
        results.push(
            ValidationResult::fail(&manifest_url, "manifest lists no delta files")
                .with_status_code(status),
        );
    } else {
        results.push(ValidationResult::pass(&manifest_url).with_status_code(status));
    }

    // Sample up to three referenced delta files; the first one also gets
    // the apply smoke test
    let mut entries: Vec<&DeltaEntry> = manifest.deltas.iter().collect();
    entries.shuffle(&mut rand::rng());
    for (index, entry) in entries.into_iter().take(DELTA_SAMPLE_COUNT).enumerate() {
        let delta_url = join_url(&config.base_url, &format!("/data/patches/{}", entry.file));
        let result = validate_one_delta(client, &delta_url, entry, index == 0, config, &retry).await;
        results.push(result);
    }

    CategoryOutcome::from_results(results)
}

async fn validate_one_delta(
    client: &Client,
    delta_url: &str,
    entry: &DeltaEntry,
    run_apply_check: bool,
    config: &ValidationConfig,
    retry: &RetryOptions,
) -> ValidationResult {
    let response = match fetch_with_retry(client, delta_url, config.timeout(), retry).await {
        Ok(response) => response,
        Err(err) => return ValidationResult::error(delta_url, err.to_string()),
    };
    let status = response.status().as_u16();
    if !response.status().is_success() {
        return ValidationResult::fail(delta_url, format!("HTTP {status}")).with_status_code(status);
    }
    let body = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            return ValidationResult::error(delta_url, format!("failed to read body: {err}"));
        }
    };
    let delta: DeltaFile = match serde_json::from_str(&body) {
        Ok(delta) => delta,
        Err(err) => {
            return ValidationResult::fail(delta_url, format!("delta failed schema check: {err}"))
                .with_status_code(status);
        }
    };

    if let Err(reason) = check_delta_against_entry(&delta, entry) {
        return ValidationResult::fail(delta_url, reason).with_status_code(status);
    }
    if run_apply_check
        && let Err(reason) = check_apply(&delta)
    {
        return ValidationResult::fail(delta_url, reason).with_status_code(status);
    }

    ValidationResult::pass(delta_url).with_status_code(status)
}
