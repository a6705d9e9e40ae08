//! End-to-end scenarios: a healthy deployment, a hard 404 failure, and
//! soft image failures, each against a full mock deployment.
//!
//! Mock precedence note: mockito matches the most recently created mock
//! first, so the catch-all page is mounted before every specific route.

mod common;

use mockito::{Matcher, ServerGuard};
use sitewarden::registry::Category;
use sitewarden::sampler::{SampleCategory, UrlSample};
use sitewarden::thresholds::{evaluate_threshold, summarize_thresholds};
use sitewarden::validators::{ValidationStatus, images};
use sitewarden::{ValidationConfig, run_validation};
use tempfile::TempDir;

/// Mount a fully healthy deployment: every page valid, endpoints and
/// bundles present, true 404s for invalid paths, no delta manifest yet
async fn mount_healthy_site(server: &mut ServerGuard) {
    // Catch-all page, lowest precedence
    server
        .mock("GET", Matcher::Regex(".*".to_string()))
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(common::valid_page_html("Card Database Page"))
        .create_async()
        .await;

    // Locale negotiation for unprefixed entry points
    server
        .mock("GET", "/")
        .with_status(302)
        .with_header("location", "/en/")
        .create_async()
        .await;
    server
        .mock("GET", "/cards")
        .with_status(302)
        .with_header("location", "/en/cards")
        .create_async()
        .await;

    // Data endpoints
    server
        .mock("GET", "/data/cards.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"cards":{"card-000":{"name":"Card 0","playable":true}}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/data/version.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"version":"2026.08.01"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(r#"<?xml version="1.0"?><urlset><url><loc>/en/</loc></url></urlset>"#)
        .create_async()
        .await;
    server
        .mock("GET", "/robots.txt")
        .with_status(200)
        .with_body("User-agent: *\nAllow: /\n")
        .create_async()
        .await;

    // Fingerprinted bundles referenced by the page template
    server
        .mock("GET", "/assets/app-9b1c.js")
        .with_status(200)
        .with_header("content-type", "text/javascript")
        .with_body("console.log('ready');")
        .create_async()
        .await;
    server
        .mock("GET", "/assets/site-3f2a.css")
        .with_status(200)
        .with_header("content-type", "text/css")
        .with_body("body { margin: 0; }")
        .create_async()
        .await;

    // Invalid paths answer with true 404s
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/(en|ja|fr|de|es)/cards/zzz-0000$".to_string()),
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/this-page-does-not-exist")
        .with_status(404)
        .create_async()
        .await;

    // First deployment: no incremental updates published yet
    server
        .mock("GET", "/data/patches/manifest.json")
        .with_status(404)
        .create_async()
        .await;

    // CDN image probes
    server
        .mock("HEAD", Matcher::Regex(r"^/images/.*\.png$".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .create_async()
        .await;
}

#[tokio::test]
async fn healthy_deployment_passes_with_deltas_warned() {
    let mut server = mockito::Server::new_async().await;
    mount_healthy_site(&mut server).await;

    let dir = TempDir::new().unwrap();
    let inventory = common::write_inventory(&dir, 3, Some(&server.url()));
    let config = common::test_config(&server.url(), inventory);

    let summary = run_validation(&config).await.unwrap();

    assert!(
        summary.success,
        "hard failures: {:?}, thresholds: {:?}",
        summary.hard_failures,
        summary
            .thresholds
            .iter()
            .map(|t| t.message.clone())
            .collect::<Vec<_>>()
    );
    assert!(summary.hard_failures.is_empty());

    // The delta category reports as warned, not failed
    let deltas = &summary.categories[&Category::Deltas];
    assert_eq!(deltas.failed, 0);
    assert_eq!(deltas.warned, 1);
    let delta_threshold = summary
        .thresholds
        .iter()
        .find(|t| t.category == Category::Deltas)
        .unwrap();
    assert!(delta_threshold.passed);
}

#[tokio::test]
async fn one_broken_page_blocks_the_deployment() {
    let mut server = mockito::Server::new_async().await;
    mount_healthy_site(&mut server).await;

    // With a single playable card, every locale samples card-000; break
    // one locale's page (mounted last, so it takes precedence)
    server
        .mock("GET", "/en/cards/card-000")
        .with_status(404)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let inventory = common::write_inventory(&dir, 1, Some(&server.url()));
    let config = common::test_config(&server.url(), inventory);

    let summary = run_validation(&config).await.unwrap();

    assert!(!summary.success);
    assert!(summary.hard_failures.contains(&Category::Pages));

    let pages_threshold = summary
        .thresholds
        .iter()
        .find(|t| t.category == Category::Pages)
        .unwrap();
    assert!(!pages_threshold.passed);
    assert_eq!(pages_threshold.failure_count, 1);

    // The broken URL is reported with its status code
    let broken = summary.categories[&Category::Pages]
        .results
        .iter()
        .find(|r| r.status == ValidationStatus::Fail)
        .unwrap();
    assert!(broken.url.contains("/en/cards/card-000"));
    assert_eq!(broken.status_code, Some(404));
}

#[tokio::test]
async fn two_image_failures_in_a_hundred_stay_soft() {
    let mut server = mockito::Server::new_async().await;

    // Catch-all success first, two specific failures layered on top
    server
        .mock("HEAD", Matcher::Regex(r"^/images/.*\.png$".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .create_async()
        .await;
    for broken in ["img-000", "img-001"] {
        server
            .mock("HEAD", format!("/images/{broken}.png").as_str())
            .with_status(404)
            .create_async()
            .await;
    }

    let config = ValidationConfig::new(server.url())
        .with_timeout_ms(2_000)
        .with_concurrency(10);
    let client = reqwest::Client::new();
    let samples: Vec<UrlSample> = (0..100)
        .map(|i| UrlSample {
            url: format!("{}/images/img-{i:03}.png", server.url()),
            category: SampleCategory::Image,
            locale: None,
        })
        .collect();

    let outcome = images::validate_images(&client, &samples, &config).await;
    assert_eq!(outcome.passed, 98);
    assert_eq!(outcome.failed, 2);

    // 98% pass with 2 absolute failures is inside the soft budget
    let threshold = evaluate_threshold(
        Category::Images,
        outcome.passed,
        outcome.total(),
        &Category::Images.spec().default_threshold,
    );
    assert!(threshold.passed);

    // A soft-passing image category never contributes a hard failure
    let summary = summarize_thresholds(&[threshold]);
    assert!(summary.success);
    assert!(summary.hard_failures.is_empty());
    assert_eq!(summary.warnings, vec![Category::Images]);
}
