//! Stratified URL sampling
//!
//! Builds the per-run sample of site URLs: card pages drawn uniformly at
//! random per locale (shuffle-then-slice, no replacement), deterministic
//! list/blog/static pages per locale, and a random subset of CDN image
//! URLs. The sample is produced once per run and consumed read-only by
//! every validator.
//!
//! Sampling is re-runnable, not replayable: no seed is persisted, so two
//! runs draw different random subsets while the fixed pages never change.

pub mod inventory;

use std::collections::HashSet;

use rand::seq::SliceRandom;

pub use inventory::{CardInventory, CardRecord};

/// Locales the site publishes; sampling covers every one of them
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ja", "fr", "de", "es"];

/// Which sampling stratum a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCategory {
    Card,
    List,
    Blog,
    Static,
    Image,
}

impl SampleCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleCategory::Card => "card",
            SampleCategory::List => "list",
            SampleCategory::Blog => "blog",
            SampleCategory::Static => "static",
            SampleCategory::Image => "image",
        }
    }
}

impl std::fmt::Display for SampleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled URL: a site-relative path, or an absolute URL for images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSample {
    pub url: String,
    pub category: SampleCategory,
    pub locale: Option<String>,
}

impl UrlSample {
    fn page(url: String, category: SampleCategory, locale: &str) -> Self {
        Self {
            url,
            category,
            locale: Some(locale.to_string()),
        }
    }
}

/// Sample-size knobs, taken from the run configuration
#[derive(Debug, Clone, Copy)]
pub struct SampleOptions {
    pub cards_per_locale: usize,
    pub image_count: usize,
}

/// The complete per-run sample set
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub pages: Vec<UrlSample>,
    pub images: Vec<UrlSample>,
}

impl SampleSet {
    /// Site-relative paths known to exist in this run's sample, used by the
    /// link validator to resolve internal hrefs without probing
    #[must_use]
    pub fn known_paths(&self) -> HashSet<String> {
        self.pages.iter().map(|sample| sample.url.clone()).collect()
    }

    /// Page samples for one category
    #[must_use]
    pub fn pages_in(&self, category: SampleCategory) -> Vec<&UrlSample> {
        self.pages
            .iter()
            .filter(|sample| sample.category == category)
            .collect()
    }
}

/// Fixed per-locale page paths that are always validated, never sampled
fn fixed_pages_for(locale: &str) -> Vec<(String, SampleCategory)> {
    vec![
        (format!("/{locale}/"), SampleCategory::List),
        (format!("/{locale}/cards"), SampleCategory::List),
        (format!("/{locale}/blog"), SampleCategory::Blog),
        (format!("/{locale}/updates"), SampleCategory::Blog),
        (format!("/{locale}/about"), SampleCategory::Static),
        (format!("/{locale}/faq"), SampleCategory::Static),
    ]
}

/// Build the stratified sample: random card pages per locale, fixed
/// list/blog/static pages per locale, and a random image subset.
#[must_use]
pub fn generate_url_samples(inventory: &CardInventory, options: &SampleOptions) -> SampleSet {
    let mut rng = rand::rng();
    let mut set = SampleSet::default();

    // Card pages: an independent uniform draw per locale
    let playable = inventory.playable_ids();
    for locale in SUPPORTED_LOCALES {
        let mut pool: Vec<&str> = playable.clone();
        pool.shuffle(&mut rng);
        for id in pool.iter().take(options.cards_per_locale) {
            set.pages.push(UrlSample::page(
                format!("/{locale}/cards/{id}"),
                SampleCategory::Card,
                locale,
            ));
        }
    }

    // Fixed pages: exactly one entry per (locale, path), deterministic
    for locale in SUPPORTED_LOCALES {
        for (url, category) in fixed_pages_for(locale) {
            set.pages.push(UrlSample::page(url, category, locale));
        }
    }

    // Images: absolute CDN URLs, drawn across the whole inventory
    let mut hd_urls = inventory.hd_image_urls();
    hd_urls.shuffle(&mut rng);
    for url in hd_urls.iter().take(options.image_count) {
        set.images.push(UrlSample {
            url: (*url).to_string(),
            category: SampleCategory::Image,
            locale: None,
        });
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn inventory_with(playable: usize, with_hd: usize) -> CardInventory {
        let mut cards = BTreeMap::new();
        for i in 0..playable {
            cards.insert(
                format!("ogn-{i:03}"),
                CardRecord {
                    name: format!("Card {i}"),
                    playable: true,
                    image_url: None,
                    image_hd_url: (i < with_hd)
                        .then(|| format!("https://cdn.example/cards/ogn-{i:03}.png")),
                },
            );
        }
        CardInventory { cards }
    }

    #[test]
    fn card_sample_size_is_cards_per_locale_times_locales() {
        let inventory = inventory_with(40, 0);
        let set = generate_url_samples(
            &inventory,
            &SampleOptions {
                cards_per_locale: 5,
                image_count: 0,
            },
        );
        let cards = set.pages_in(SampleCategory::Card);
        assert_eq!(cards.len(), 5 * SUPPORTED_LOCALES.len());
    }

    #[test]
    fn fixed_pages_appear_exactly_once_per_locale() {
        let inventory = inventory_with(3, 0);
        let set = generate_url_samples(
            &inventory,
            &SampleOptions {
                cards_per_locale: 1,
                image_count: 0,
            },
        );
        for locale in SUPPORTED_LOCALES {
            let home = format!("/{locale}/");
            let count = set.pages.iter().filter(|s| s.url == home).count();
            assert_eq!(count, 1, "locale {locale} home sampled {count} times");
        }
    }

    #[test]
    fn draw_is_without_replacement() {
        let inventory = inventory_with(10, 0);
        let set = generate_url_samples(
            &inventory,
            &SampleOptions {
                cards_per_locale: 10,
                image_count: 0,
            },
        );
        for locale in SUPPORTED_LOCALES {
            let urls: Vec<&String> = set
                .pages_in(SampleCategory::Card)
                .into_iter()
                .filter(|s| s.locale.as_deref() == Some(*locale))
                .map(|s| &s.url)
                .collect();
            let unique: HashSet<&&String> = urls.iter().collect();
            assert_eq!(urls.len(), unique.len());
        }
    }

    #[test]
    fn small_pool_caps_the_draw() {
        let inventory = inventory_with(2, 0);
        let set = generate_url_samples(
            &inventory,
            &SampleOptions {
                cards_per_locale: 5,
                image_count: 0,
            },
        );
        let cards = set.pages_in(SampleCategory::Card);
        assert_eq!(cards.len(), 2 * SUPPORTED_LOCALES.len());
    }

    #[test]
    fn image_samples_are_absolute_and_unprefixed() {
        let inventory = inventory_with(30, 25);
        let set = generate_url_samples(
            &inventory,
            &SampleOptions {
                cards_per_locale: 0,
                image_count: 10,
            },
        );
        assert_eq!(set.images.len(), 10);
        for sample in &set.images {
            assert!(sample.url.starts_with("https://cdn.example/"));
            assert_eq!(sample.category, SampleCategory::Image);
            assert!(sample.locale.is_none());
        }
    }
}
