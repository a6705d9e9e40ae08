//! Structural checks over raw markup text
//!
//! The whole battery is pattern matching against the page source as
//! shipped — no rendered DOM, no script execution. That keeps the checks
//! cheap enough to run against every sampled page and immune to
//! client-side hydration differences.
//!
//! Patterns are compiled once into statics; the per-page work is plain
//! scanning.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::{CheckOutcome, ValidationResult};
use crate::retry::{RetryOptions, fetch_with_retry};

/// Fetch a page's raw markup through the retry engine.
///
/// Returns the ready-made failure record on anything short of a readable
/// 2xx body, so markup validators can stay focused on their checks.
pub(crate) async fn fetch_markup(
    client: &Client,
    url: &str,
    timeout: Duration,
    retry: &RetryOptions,
) -> Result<String, Box<ValidationResult>> {
    match fetch_with_retry(client, url, timeout, retry).await {
        Ok(response) => {
            let status = response.status().as_u16();
            if !response.status().is_success() {
                return Err(Box::new(
                    ValidationResult::fail(url, format!("HTTP {status}")).with_status_code(status),
                ));
            }
            match response.text().await {
                Ok(text) => Ok(text),
                Err(err) => Err(Box::new(ValidationResult::error(
                    url,
                    format!("failed to read body: {err}"),
                ))),
            }
        }
        Err(err) => Err(Box::new(ValidationResult::error(url, err.to_string()))),
    }
}

static RE_DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!doctype\s+html").expect("doctype pattern"));
static RE_HTML_LANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<html[^>]*\slang\s*=\s*["'][a-z]{2}[a-z-]*["']"#).expect("lang pattern"));
static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h([1-6])[\s>]").expect("heading pattern"));
static RE_MAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<main[\s>]|role\s*=\s*["']main["']"#).expect("main pattern"));
static RE_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("img pattern"));
static RE_ALT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\balt\s*=").expect("alt pattern"));
static RE_ARIA_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\baria-label(?:ledby)?\s*=").expect("aria pattern"));
static RE_BUTTON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<button\b([^>]*)>(.*?)</button>").expect("button pattern"));
static RE_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").expect("anchor pattern"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
static RE_INPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<input\b[^>]*>").expect("input pattern"));
static RE_INPUT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\btype\s*=\s*["']?([a-z]+)"#).expect("input type pattern"));
static RE_ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bid\s*=\s*["']([^"']+)["']"#).expect("id pattern"));
static RE_NAV: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<nav[\s>]").expect("nav pattern"));
static RE_SKIP_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*href\s*=\s*["']#(?:main|content|main-content)["']"#)
        .expect("skip link pattern")
});
static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern"));
static RE_META: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<meta\b[^>]*>").expect("meta pattern"));
static RE_NAME_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bname\s*=\s*["']description["']"#).expect("description pattern"));
static RE_OG_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bproperty\s*=\s*["']og:title["']"#).expect("og pattern"));
static RE_CONTENT_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("content pattern"));
static RE_LINK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<link\b[^>]*>").expect("link pattern"));
static RE_REL_CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']canonical["']"#).expect("canonical pattern"));
static RE_REL_STYLESHEET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']stylesheet["']"#).expect("stylesheet pattern"));
static RE_HREF_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#).expect("href pattern"));
static RE_SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).expect("script pattern")
});

/// Visible text of a markup fragment: tags stripped, whitespace trimmed
fn stripped_text(fragment: &str) -> String {
    RE_TAG.replace_all(fragment, " ").trim().to_string()
}

pub fn check_doctype(html: &str) -> CheckOutcome {
    if RE_DOCTYPE.is_match(html) {
        CheckOutcome::pass("doctype")
    } else {
        CheckOutcome::fail("doctype", "missing <!DOCTYPE html>")
    }
}

pub fn check_lang_attribute(html: &str) -> CheckOutcome {
    if RE_HTML_LANG.is_match(html) {
        CheckOutcome::pass("lang-attribute")
    } else {
        CheckOutcome::fail("lang-attribute", "root element has no lang attribute")
    }
}

/// Exactly one top-level heading
pub fn check_single_h1(html: &str) -> CheckOutcome {
    let h1_count = RE_HEADING
        .captures_iter(html)
        .filter(|caps| &caps[1] == "1")
        .count();
    if h1_count == 1 {
        CheckOutcome::pass("single-h1")
    } else {
        CheckOutcome::fail("single-h1", format!("found {h1_count} <h1> elements")).with_count(h1_count)
    }
}

/// Heading levels never skip: an hN may only be followed by at most hN+1
/// when descending, and the document must open at h1.
pub fn check_heading_order(html: &str) -> CheckOutcome {
    let mut previous = 0u32;
    for caps in RE_HEADING.captures_iter(html) {
        let level: u32 = caps[1].parse().unwrap_or(6);
        if level > previous + 1 {
            return CheckOutcome::fail(
                "heading-order",
                format!("h{level} follows h{previous}, skipping a level"),
            );
        }
        previous = level;
    }
    CheckOutcome::pass("heading-order")
}

pub fn check_main_landmark(html: &str) -> CheckOutcome {
    if RE_MAIN.is_match(html) {
        CheckOutcome::pass("main-landmark")
    } else {
        CheckOutcome::fail("main-landmark", "no <main> element or role=\"main\"")
    }
}

/// Every image carries an alt attribute (empty alt is fine — it marks
/// decorative images)
pub fn check_image_alts(html: &str) -> CheckOutcome {
    let missing = RE_IMG
        .find_iter(html)
        .filter(|tag| !RE_ALT_ATTR.is_match(tag.as_str()))
        .count();
    if missing == 0 {
        CheckOutcome::pass("image-alt")
    } else {
        CheckOutcome::fail("image-alt", format!("{missing} image(s) missing alt")).with_count(missing)
    }
}

/// Buttons and links expose accessible text: visible content, an ARIA
/// label, or labelled imagery inside
pub fn check_interactive_labels(html: &str) -> CheckOutcome {
    let mut unlabeled = 0usize;

    for caps in RE_BUTTON.captures_iter(html) {
        let attrs = &caps[1];
        let inner = &caps[2];
        if !RE_ARIA_LABEL.is_match(attrs)
            && stripped_text(inner).is_empty()
            && !RE_ALT_ATTR.is_match(inner)
        {
            unlabeled += 1;
        }
    }
    for caps in RE_ANCHOR.captures_iter(html) {
        let attrs = &caps[1];
        let inner = &caps[2];
        if !RE_ARIA_LABEL.is_match(attrs)
            && stripped_text(inner).is_empty()
            && !RE_ALT_ATTR.is_match(inner)
        {
            unlabeled += 1;
        }
    }

    if unlabeled == 0 {
        CheckOutcome::pass("control-labels")
    } else {
        CheckOutcome::fail(
            "control-labels",
            format!("{unlabeled} control(s) without accessible text"),
        )
        .with_count(unlabeled)
    }
}

/// Form controls are labelled via `<label for>` or an ARIA label.
/// Hidden and button-like inputs don't need one.
pub fn check_form_labels(html: &str) -> CheckOutcome {
    let mut unlabeled = 0usize;

    for tag in RE_INPUT.find_iter(html) {
        let tag = tag.as_str();
        let input_type = RE_INPUT_TYPE
            .captures(tag)
            .map(|caps| caps[1].to_lowercase())
            .unwrap_or_else(|| "text".to_string());
        if matches!(input_type.as_str(), "hidden" | "submit" | "button" | "image") {
            continue;
        }
        if RE_ARIA_LABEL.is_match(tag) {
            continue;
        }
        let labelled = RE_ID_ATTR.captures(tag).is_some_and(|caps| {
            let id = regex::escape(&caps[1]);
            Regex::new(&format!(r#"(?i)<label\b[^>]*\bfor\s*=\s*["']{id}["']"#))
                .map(|re| re.is_match(html))
                .unwrap_or(false)
        });
        if !labelled {
            unlabeled += 1;
        }
    }

    if unlabeled == 0 {
        CheckOutcome::pass("form-labels")
    } else {
        CheckOutcome::fail(
            "form-labels",
            format!("{unlabeled} form control(s) without a label"),
        )
        .with_count(unlabeled)
    }
}

/// Keyboard users need either a skip link or a navigation region
pub fn check_skip_link_or_nav(html: &str) -> CheckOutcome {
    if RE_SKIP_LINK.is_match(html) || RE_NAV.is_match(html) {
        CheckOutcome::pass("skip-link-or-nav")
    } else {
        CheckOutcome::fail("skip-link-or-nav", "no skip link and no <nav> region")
    }
}

/// Title present and within search-snippet bounds
pub fn check_title(html: &str) -> CheckOutcome {
    match RE_TITLE.captures(html) {
        Some(caps) => {
            let title = stripped_text(&caps[1]);
            let len = title.chars().count();
            if (10..=70).contains(&len) {
                CheckOutcome::pass("title-length")
            } else {
                CheckOutcome::fail(
                    "title-length",
                    format!("title is {len} chars, expected 10-70"),
                )
                .with_count(len)
            }
        }
        None => CheckOutcome::fail("title-length", "missing <title>"),
    }
}

/// Meta description present and within snippet bounds
pub fn check_meta_description(html: &str) -> CheckOutcome {
    let description = RE_META
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|tag| RE_NAME_DESCRIPTION.is_match(tag))
        .and_then(|tag| RE_CONTENT_ATTR.captures(tag).map(|caps| caps[1].to_string()));

    match description {
        Some(content) => {
            let len = content.chars().count();
            if (50..=160).contains(&len) {
                CheckOutcome::pass("meta-description")
            } else {
                CheckOutcome::fail(
                    "meta-description",
                    format!("description is {len} chars, expected 50-160"),
                )
                .with_count(len)
            }
        }
        None => CheckOutcome::fail("meta-description", "missing meta description"),
    }
}

pub fn check_canonical(html: &str) -> CheckOutcome {
    let found = RE_LINK_TAG
        .find_iter(html)
        .any(|tag| RE_REL_CANONICAL.is_match(tag.as_str()));
    if found {
        CheckOutcome::pass("canonical")
    } else {
        CheckOutcome::fail("canonical", "missing canonical link")
    }
}

pub fn check_og_title(html: &str) -> CheckOutcome {
    let found = RE_META
        .find_iter(html)
        .any(|tag| RE_OG_TITLE.is_match(tag.as_str()));
    if found {
        CheckOutcome::pass("og-title")
    } else {
        CheckOutcome::fail("og-title", "missing og:title")
    }
}

/// Site-relative href targets from anchor tags, query and fragment
/// stripped, protocol-relative URLs excluded
#[must_use]
pub fn extract_internal_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    for caps in RE_ANCHOR.captures_iter(html) {
        if let Some(href_caps) = RE_HREF_ATTR.captures(&caps[1]) {
            let href = &href_caps[1];
            if href.starts_with('/') && !href.starts_with("//") {
                let trimmed = href
                    .split(['#', '?'])
                    .next()
                    .unwrap_or(href)
                    .to_string();
                if !trimmed.is_empty() {
                    links.push(trimmed);
                }
            }
        }
    }
    links
}

/// Script and stylesheet asset URLs referenced by a page
#[must_use]
pub fn extract_asset_urls(html: &str) -> Vec<String> {
    let mut assets = Vec::new();
    for caps in RE_SCRIPT_SRC.captures_iter(html) {
        assets.push(caps[1].to_string());
    }
    for tag in RE_LINK_TAG.find_iter(html) {
        let tag = tag.as_str();
        if RE_REL_STYLESHEET.is_match(tag)
            && let Some(caps) = RE_HREF_ATTR.captures(tag)
        {
            assets.push(caps[1].to_string());
        }
    }
    assets
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Ironclad Vanguard - Card Database</title>
    <meta name="description" content="Stats, rulings and printings for Ironclad Vanguard across every released set and format.">
    <meta property="og:title" content="Ironclad Vanguard">
    <link rel="canonical" href="https://cards.example/en/cards/ogn-001">
    <link rel="stylesheet" href="/assets/site-3f2a.css">
    <script src="/assets/app-9b1c.js"></script>
</head>
<body>
    <a href="#main" class="skip">Skip to content</a>
    <nav><a href="/en/">Home</a> <a href="/en/cards?page=2">Cards</a></nav>
    <main id="main">
        <h1>Ironclad Vanguard</h1>
        <h2>Rulings</h2>
        <h3>Official</h3>
        <img src="/img/ogn-001.png" alt="Ironclad Vanguard card art">
        <form>
            <label for="q">Search</label>
            <input id="q" type="text">
            <input type="hidden" name="token">
        </form>
        <button>Add to deck</button>
    </main>
</body>
</html>"##;

    #[test]
    fn valid_page_passes_every_check() {
        let checks = [
            check_doctype(VALID_PAGE),
            check_lang_attribute(VALID_PAGE),
            check_single_h1(VALID_PAGE),
            check_heading_order(VALID_PAGE),
            check_main_landmark(VALID_PAGE),
            check_image_alts(VALID_PAGE),
            check_interactive_labels(VALID_PAGE),
            check_form_labels(VALID_PAGE),
            check_skip_link_or_nav(VALID_PAGE),
            check_title(VALID_PAGE),
            check_meta_description(VALID_PAGE),
            check_canonical(VALID_PAGE),
            check_og_title(VALID_PAGE),
        ];
        for check in checks {
            assert!(check.passed, "{} failed: {:?}", check.name, check.detail);
        }
    }

    #[test]
    fn two_h1s_fail() {
        let html = "<h1>a</h1><h1>b</h1>";
        let check = check_single_h1(html);
        assert!(!check.passed);
        assert_eq!(check.count, Some(2));
    }

    #[test]
    fn skipped_heading_level_fails() {
        let html = "<h1>a</h1><h3>b</h3>";
        let check = check_heading_order(html);
        assert!(!check.passed);
        assert!(check.detail.unwrap().contains("h3"));
    }

    #[test]
    fn document_opening_below_h1_fails() {
        let check = check_heading_order("<h2>straight to two</h2>");
        assert!(!check.passed);
    }

    #[test]
    fn descending_headings_are_fine() {
        let check = check_heading_order("<h1>a</h1><h2>b</h2><h3>c</h3><h2>d</h2>");
        assert!(check.passed);
    }

    #[test]
    fn missing_alt_is_counted() {
        let html = r#"<img src="a.png" alt="a"><img src="b.png"><img src="c.png">"#;
        let check = check_image_alts(html);
        assert!(!check.passed);
        assert_eq!(check.count, Some(2));
    }

    #[test]
    fn empty_alt_is_accepted() {
        let check = check_image_alts(r#"<img src="decorative.png" alt="">"#);
        assert!(check.passed);
    }

    #[test]
    fn icon_button_without_label_fails() {
        let html = r#"<button><svg viewBox="0 0 16 16"></svg></button>"#;
        let check = check_interactive_labels(html);
        assert!(!check.passed);
    }

    #[test]
    fn aria_labelled_icon_button_passes() {
        let html = r#"<button aria-label="Close"><svg viewBox="0 0 16 16"></svg></button>"#;
        let check = check_interactive_labels(html);
        assert!(check.passed);
    }

    #[test]
    fn unlabelled_text_input_fails() {
        let html = r#"<input type="text" id="orphan">"#;
        let check = check_form_labels(html);
        assert!(!check.passed);
    }

    #[test]
    fn title_length_bounds_are_enforced() {
        assert!(!check_title("<title>short</title>").passed);
        assert!(check_title("<title>A perfectly reasonable page title</title>").passed);
        assert!(!check_title("<html></html>").passed);
    }

    #[test]
    fn description_attribute_order_does_not_matter() {
        let html = r#"<meta content="A sufficiently long description of the page content to satisfy the snippet bounds." name="description">"#;
        assert!(check_meta_description(html).passed);
    }

    #[test]
    fn internal_links_strip_query_and_fragment() {
        let html = r##"<a href="/en/cards?page=2">p</a><a href="/en/about#team">t</a>
            <a href="https://other.example/x">ext</a><a href="//cdn.example/y">proto</a>"##;
        assert_eq!(
            extract_internal_links(html),
            vec!["/en/cards".to_string(), "/en/about".to_string()]
        );
    }

    #[test]
    fn asset_extraction_finds_scripts_and_styles() {
        let assets = extract_asset_urls(VALID_PAGE);
        assert!(assets.contains(&"/assets/app-9b1c.js".to_string()));
        assert!(assets.contains(&"/assets/site-3f2a.css".to_string()));
    }
}
