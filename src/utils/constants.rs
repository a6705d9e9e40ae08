//! Shared configuration constants for sitewarden
//!
//! This module contains default values used throughout the codebase to
//! ensure consistency and avoid magic numbers.

/// Default per-call timeout: 10 seconds
///
/// Covers cold CDN edges and first-hit rendering on a fresh deployment.
/// A call that takes longer is recorded as an `error`-status result, not
/// a validation failure.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default batch width: 10 concurrent requests
///
/// Caps simultaneous outbound connections within a single validator so a
/// validation run never reads as a traffic spike on the deployment it is
/// supposed to be protecting.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default card pages sampled per locale: 5
///
/// With five locales this yields 25 random card pages per run — enough to
/// catch template regressions without crawling the whole database.
pub const DEFAULT_CARDS_PER_LOCALE: usize = 5;

/// Default CDN images probed per run: 20
pub const DEFAULT_IMAGE_SAMPLES: usize = 20;

/// Hard response-time ceiling: 5 seconds
///
/// Pages slower than this fail the performance category outright.
pub const DEFAULT_MAX_RESPONSE_TIME_MS: u64 = 5_000;

/// Soft response-time ceiling: 2 seconds
///
/// Pages between the soft and hard ceilings pass but are flagged as slow.
pub const DEFAULT_WARN_RESPONSE_TIME_MS: u64 = 2_000;

/// Hard payload ceiling for sampled pages: 2 MiB
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// User agent sent with every probe, so validation traffic is easy to
/// filter out of the site analytics
pub const VALIDATOR_USER_AGENT: &str = concat!("sitewarden/", env!("CARGO_PKG_VERSION"));
