//! Sampler: stratification, determinism of fixed pages, proportionality

mod common;

use std::collections::HashSet;

use sitewarden::sampler::{
    CardInventory, SUPPORTED_LOCALES, SampleCategory, SampleOptions, generate_url_samples,
};
use tempfile::TempDir;

fn load_test_inventory(playable: usize, with_images: bool) -> CardInventory {
    let dir = TempDir::new().unwrap();
    let base = with_images.then_some("https://cdn.example");
    let path = common::write_inventory(&dir, playable, base);
    CardInventory::load(&path).unwrap()
}

#[test]
fn fixed_pages_are_identical_across_runs() {
    let inventory = load_test_inventory(20, false);
    let options = SampleOptions {
        cards_per_locale: 3,
        image_count: 0,
    };

    let first = generate_url_samples(&inventory, &options);
    let second = generate_url_samples(&inventory, &options);

    let fixed = |set: &sitewarden::SampleSet| -> Vec<String> {
        set.pages
            .iter()
            .filter(|s| s.category != SampleCategory::Card)
            .map(|s| s.url.clone())
            .collect()
    };
    assert_eq!(fixed(&first), fixed(&second));

    // Exactly one home entry per supported locale, regardless of RNG state
    for locale in SUPPORTED_LOCALES {
        let home = format!("/{locale}/");
        assert_eq!(first.pages.iter().filter(|s| s.url == home).count(), 1);
    }
}

#[test]
fn card_sample_is_proportional_across_locales() {
    let inventory = load_test_inventory(50, false);
    let set = generate_url_samples(
        &inventory,
        &SampleOptions {
            cards_per_locale: 7,
            image_count: 0,
        },
    );

    let cards = set.pages_in(SampleCategory::Card);
    assert_eq!(cards.len(), 7 * SUPPORTED_LOCALES.len());
    for locale in SUPPORTED_LOCALES {
        let per_locale = cards
            .iter()
            .filter(|s| s.locale.as_deref() == Some(*locale))
            .count();
        assert_eq!(per_locale, 7, "locale {locale} drew {per_locale} cards");
    }
}

#[test]
fn image_samples_come_from_the_inventory_cdn_urls() {
    let inventory = load_test_inventory(30, true);
    let set = generate_url_samples(
        &inventory,
        &SampleOptions {
            cards_per_locale: 1,
            image_count: 12,
        },
    );

    assert_eq!(set.images.len(), 12);
    let unique: HashSet<&String> = set.images.iter().map(|s| &s.url).collect();
    assert_eq!(unique.len(), 12, "image draw must be without replacement");
    for sample in &set.images {
        assert!(sample.url.starts_with("https://cdn.example/images/card-"));
    }
}

#[test]
fn known_paths_cover_every_sampled_page() {
    let inventory = load_test_inventory(10, false);
    let set = generate_url_samples(
        &inventory,
        &SampleOptions {
            cards_per_locale: 2,
            image_count: 0,
        },
    );
    let known = set.known_paths();
    for sample in &set.pages {
        assert!(known.contains(&sample.url));
    }
}

#[test]
fn missing_inventory_is_a_loud_error() {
    let err = CardInventory::load(std::path::Path::new("/nonexistent/cards.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read card inventory"));
}
