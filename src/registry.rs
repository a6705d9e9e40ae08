//! Category registry: the single source of truth for validation categories
//!
//! Every validation category is described by exactly one `CategorySpec` row:
//! its wire name, display name, default threshold, and remediation hint.
//! The orchestrator, the threshold engine, and the report renderer all
//! iterate or index this table. Adding a validator means adding one row
//! here and one phase in the orchestrator — nothing else.

use crate::thresholds::ThresholdConfig;

/// Validation category identifier
///
/// Discriminant order matches `REGISTRY` row order; `Category::spec()`
/// relies on that invariant (covered by a test below).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    LocaleRedirects = 0,
    Pages = 1,
    Html = 2,
    Links = 3,
    Seo = 4,
    Endpoints = 5,
    Bundles = 6,
    ErrorPages = 7,
    Images = 8,
    Accessibility = 9,
    Performance = 10,
    Deltas = 11,
}

impl Category {
    /// All categories in orchestrator phase order
    pub const ALL: &'static [Category] = &[
        Category::LocaleRedirects,
        Category::Pages,
        Category::Html,
        Category::Links,
        Category::Seo,
        Category::Endpoints,
        Category::Bundles,
        Category::ErrorPages,
        Category::Images,
        Category::Accessibility,
        Category::Performance,
        Category::Deltas,
    ];

    /// Stable wire name used in CI outputs and threshold env keys
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::LocaleRedirects => "locale_redirects",
            Category::Pages => "pages",
            Category::Html => "html",
            Category::Links => "links",
            Category::Seo => "seo",
            Category::Endpoints => "endpoints",
            Category::Bundles => "bundles",
            Category::ErrorPages => "error_pages",
            Category::Images => "images",
            Category::Accessibility => "accessibility",
            Category::Performance => "performance",
            Category::Deltas => "deltas",
        }
    }

    /// Uppercase key segment for `THRESHOLD_<CATEGORY>_*` env overrides
    #[must_use]
    pub fn env_key(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Registry row for this category
    #[must_use]
    pub fn spec(&self) -> &'static CategorySpec {
        &REGISTRY[*self as usize]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry row: everything the rest of the system needs to know
/// about a category without hardcoding it elsewhere
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub category: Category,
    /// Human-facing name used in the report
    pub display_name: &'static str,
    /// Threshold applied when no env override is present
    pub default_threshold: ThresholdConfig,
    /// Actionable next step shown when this category fails a run
    pub remediation: &'static str,
}

/// Hard categories require a perfect pass; soft categories tolerate the
/// stated failure budget and only ever warn.
pub static REGISTRY: &[CategorySpec] = &[
    CategorySpec {
        category: Category::LocaleRedirects,
        display_name: "Locale redirects",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Check the locale negotiation middleware and the redirect rules for unprefixed paths.",
    },
    CategorySpec {
        category: Category::Pages,
        display_name: "Page reachability",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Inspect the build output for missing pages and the host's routing table for the listed URLs.",
    },
    CategorySpec {
        category: Category::Html,
        display_name: "HTML sanity",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Run the failing pages through the layout templates locally; a shared layout change usually breaks all locales at once.",
    },
    CategorySpec {
        category: Category::Links,
        display_name: "Internal links",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Grep the content sources for the broken hrefs; stale card ids after a data refresh are the usual cause.",
    },
    CategorySpec {
        category: Category::Seo,
        display_name: "SEO tags",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Verify the head component renders title/description/canonical for the failing page type.",
    },
    CategorySpec {
        category: Category::Endpoints,
        display_name: "Data endpoints",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Confirm the data export step ran in this build and the JSON artifacts were uploaded.",
    },
    CategorySpec {
        category: Category::Bundles,
        display_name: "JS bundles",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "The HTML references bundle hashes that are missing from the deploy; re-upload assets or redeploy atomically.",
    },
    CategorySpec {
        category: Category::ErrorPages,
        display_name: "Error pages",
        default_threshold: ThresholdConfig::hard(1.0),
        remediation: "Check the 404 route and the client-side not-found fallback.",
    },
    CategorySpec {
        category: Category::Images,
        display_name: "Image availability",
        default_threshold: ThresholdConfig::soft(0.98).with_max_failures(3),
        remediation: "Spot-check the CDN bucket for the listed card images; re-run the image sync job if several are missing.",
    },
    CategorySpec {
        category: Category::Accessibility,
        display_name: "Accessibility",
        default_threshold: ThresholdConfig::soft(0.95),
        remediation: "Review alt text and control labeling on the failing pages.",
    },
    CategorySpec {
        category: Category::Performance,
        display_name: "Performance",
        default_threshold: ThresholdConfig::soft(0.90),
        remediation: "Compare payload sizes against the previous deploy; a bundle or image regression is the usual cause of slow pages.",
    },
    CategorySpec {
        category: Category::Deltas,
        display_name: "Delta updates",
        default_threshold: ThresholdConfig::soft(0.80),
        remediation: "Regenerate the incremental update files; a malformed delta forces clients into a full re-download.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_discriminants() {
        for (idx, spec) in REGISTRY.iter().enumerate() {
            assert_eq!(spec.category as usize, idx, "row {idx} out of order");
        }
        assert_eq!(REGISTRY.len(), Category::ALL.len());
    }

    #[test]
    fn wire_names_are_unique() {
        let mut names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn env_keys_are_uppercase() {
        assert_eq!(Category::ErrorPages.env_key(), "ERROR_PAGES");
        assert_eq!(Category::Pages.env_key(), "PAGES");
    }
}
