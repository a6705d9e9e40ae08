//! Build-artifact card inventory
//!
//! The site generator emits `cards.json` alongside the rendered pages: one
//! record per card id with its playability flag and CDN image URLs. The
//! sampler reads it once per run; everything downstream treats it as
//! read-only.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One card record from the build artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    /// Cards not yet legal in play are excluded from sampling
    #[serde(default)]
    pub playable: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    /// High-resolution CDN URL, present for cards with finished art
    #[serde(default)]
    pub image_hd_url: Option<String>,
}

/// The full content inventory, keyed by card id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardInventory {
    pub cards: BTreeMap<String, CardRecord>,
}

impl CardInventory {
    /// Load the inventory from a build artifact on disk.
    ///
    /// # Errors
    ///
    /// A missing or malformed inventory is a configuration-level problem
    /// and propagates to the process boundary (fail-loud).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read card inventory at {}", path.display()))?;
        let inventory: CardInventory = serde_json::from_str(&raw)
            .with_context(|| format!("card inventory at {} is not valid JSON", path.display()))?;
        Ok(inventory)
    }

    /// Ids of cards eligible for page sampling
    #[must_use]
    pub fn playable_ids(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|(_, record)| record.playable)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Absolute CDN URLs of cards carrying a high-resolution image
    #[must_use]
    pub fn hd_image_urls(&self) -> Vec<&str> {
        self.cards
            .values()
            .filter(|record| record.playable)
            .filter_map(|record| record.image_hd_url.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(playable: bool, hd: Option<&str>) -> CardRecord {
        CardRecord {
            name: "Test Card".to_string(),
            playable,
            image_url: None,
            image_hd_url: hd.map(str::to_string),
        }
    }

    #[test]
    fn playable_filter_excludes_unplayable() {
        let mut inventory = CardInventory::default();
        inventory.cards.insert("a-001".into(), record(true, None));
        inventory.cards.insert("a-002".into(), record(false, None));
        inventory.cards.insert("a-003".into(), record(true, None));
        assert_eq!(inventory.playable_ids(), vec!["a-001", "a-003"]);
    }

    #[test]
    fn hd_urls_require_both_playable_and_image() {
        let mut inventory = CardInventory::default();
        inventory
            .cards
            .insert("a-001".into(), record(true, Some("https://cdn.example/a-001.png")));
        inventory.cards.insert("a-002".into(), record(true, None));
        inventory
            .cards
            .insert("a-003".into(), record(false, Some("https://cdn.example/a-003.png")));
        assert_eq!(
            inventory.hd_image_urls(),
            vec!["https://cdn.example/a-001.png"]
        );
    }
}
