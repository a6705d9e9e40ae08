//! Test utilities and fixtures for the sitewarden test suite

use std::path::PathBuf;

use sitewarden::ValidationConfig;
use tempfile::TempDir;

/// A page that passes every structural, accessibility and SEO check.
///
/// Keep this in sync with the markup battery: the end-to-end tests serve
/// it for every sampled page, so a single failing check here would fail
/// three hard categories at once.
#[allow(dead_code)]
pub fn valid_page_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta name="description" content="Card statistics, rulings and printings for every released set, updated after each deployment.">
    <meta property="og:title" content="{title}">
    <link rel="canonical" href="https://cards.example/en/cards/ogn-001">
    <link rel="stylesheet" href="/assets/site-3f2a.css">
    <script src="/assets/app-9b1c.js"></script>
</head>
<body>
    <a href="#main" class="skip">Skip to content</a>
    <nav><a href="/en/">Home</a> <a href="/en/cards?page=2">Cards</a></nav>
    <main id="main">
        <h1>{title}</h1>
        <h2>Details</h2>
        <img src="/img/art.png" alt="Card artwork">
        <form>
            <label for="q">Search</label>
            <input id="q" type="text">
        </form>
        <button>Add to deck</button>
    </main>
</body>
</html>"##
    )
}

/// Write a card inventory artifact with `playable` cards; when `hd_base`
/// is set, every card carries an HD image URL under that base.
#[allow(dead_code)]
pub fn write_inventory(dir: &TempDir, playable: usize, hd_base: Option<&str>) -> PathBuf {
    let mut cards = serde_json::Map::new();
    for i in 0..playable {
        let id = format!("card-{i:03}");
        let mut record = serde_json::Map::new();
        record.insert("name".into(), format!("Card {i}").into());
        record.insert("playable".into(), true.into());
        if let Some(base) = hd_base {
            record.insert(
                "image_hd_url".into(),
                format!("{base}/images/{id}.png").into(),
            );
        }
        cards.insert(id, record.into());
    }
    let inventory = serde_json::json!({ "cards": cards });

    let path = dir.path().join("cards.json");
    std::fs::write(&path, serde_json::to_string_pretty(&inventory).unwrap()).unwrap();
    path
}

/// Run configuration pointed at a mock server, sized for fast tests
#[allow(dead_code)]
pub fn test_config(base_url: &str, inventory: PathBuf) -> ValidationConfig {
    ValidationConfig::new(base_url)
        .with_inventory_path(inventory)
        .with_timeout_ms(5_000)
        .with_concurrency(4)
        .with_sample_sizes(1, 2)
}
