//! Report rendering and CI outputs
//!
//! The human-readable report goes to stdout for the operator reading the
//! CI log; `log` stays reserved for diagnostics. Machine-readable results
//! are appended as key-value lines to the configured CI output file.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::orchestrator::ValidationSummary;
use crate::registry::Category;
use crate::validators::{ValidationResult, ValidationStatus};

/// Failing items listed per category before truncating
const MAX_LISTED_FAILURES: usize = 10;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

fn describe_failure(result: &ValidationResult) -> String {
    let cause = result
        .error
        .as_deref()
        .unwrap_or("failed");
    match result.status_code {
        Some(code) => format!("{} — {cause} (HTTP {code})", result.url),
        None => format!("{} — {cause}", result.url),
    }
}

fn category_status_label(summary: &ValidationSummary, category: Category) -> &'static str {
    if summary.hard_failures.contains(&category) {
        "FAIL"
    } else if summary.soft_failures.contains(&category) {
        "SOFT"
    } else if summary.warnings.contains(&category) {
        "WARN"
    } else {
        "PASS"
    }
}

/// Render the structured run report to stdout
pub fn render_report(summary: &ValidationSummary) {
    println!("{RULE}");
    println!(" sitewarden — deployment validation");
    println!(" target:  {}", summary.base_url);
    if let Some(commit) = &summary.commit {
        println!(" commit:  {commit}");
    }
    println!(" started: {}", summary.started_at.format("%Y-%m-%dT%H:%M:%SZ"));
    println!("{RULE}");
    println!();

    for threshold in &summary.thresholds {
        let category = threshold.category;
        let label = category_status_label(summary, category);
        println!(
            " [{label}] {:<22} {:>4}/{:<4} ({:.1}%)",
            category.spec().display_name,
            threshold.pass_count,
            threshold.total_count,
            threshold.pass_rate * 100.0
        );

        if let Some(outcome) = summary.categories.get(&category) {
            let failing: Vec<&ValidationResult> = outcome
                .results
                .iter()
                .filter(|result| result.status != ValidationStatus::Pass)
                .collect();
            for result in failing.iter().take(MAX_LISTED_FAILURES) {
                println!("        - {}", describe_failure(result));
            }
            if failing.len() > MAX_LISTED_FAILURES {
                println!("        ... and {} more", failing.len() - MAX_LISTED_FAILURES);
            }
            for result in &outcome.results {
                if result.status == ValidationStatus::Pass
                    && let Some(warning) = &result.warning
                {
                    println!("        ~ {} — {warning}", result.url);
                }
            }
        }
    }

    if let Some(stats) = &summary.perf_stats {
        println!();
        println!(
            " response times: min {}ms / avg {}ms / p50 {}ms / p95 {}ms / p99 {}ms / max {}ms",
            stats.min_ms, stats.avg_ms, stats.p50_ms, stats.p95_ms, stats.p99_ms, stats.max_ms
        );
    }

    println!();
    println!("{THIN_RULE}");
    println!(" hard failures: {}", summary.hard_failures.len());
    println!(" soft failures: {}", summary.soft_failures.len());
    println!(" warnings:      {}", summary.warnings.len());
    println!(" duration:      {:.1}s", summary.duration.as_secs_f64());
    println!();

    if summary.success {
        println!(" VERDICT: PASS — deployment healthy");
    } else {
        println!(" VERDICT: FAIL — deployment blocked");
    }

    // One remediation hint per distinct failing category, deduplicated
    let failing: BTreeSet<Category> = summary
        .hard_failures
        .iter()
        .chain(summary.soft_failures.iter())
        .copied()
        .collect();
    if !failing.is_empty() {
        println!();
        println!(" Remediation:");
        for category in failing {
            let spec = category.spec();
            println!("  - {}: {}", spec.display_name, spec.remediation);
        }
    }
    println!("{RULE}");
}

/// Append machine-readable key-value results to the CI output channel.
///
/// # Errors
///
/// Fails when the output file can't be opened or written.
pub fn write_ci_outputs(summary: &ValidationSummary, path: &Path) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open CI output file {}", path.display()))?;

    writeln!(file, "success={}", summary.success)?;
    for threshold in &summary.thresholds {
        let key = threshold.category.as_str();
        writeln!(file, "{key}_passed={}", threshold.pass_count)?;
        writeln!(file, "{key}_total={}", threshold.total_count)?;
    }
    Ok(())
}
