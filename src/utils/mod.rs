//! Shared utilities and constants

pub mod constants;

pub use constants::{
    DEFAULT_CARDS_PER_LOCALE, DEFAULT_CONCURRENCY, DEFAULT_IMAGE_SAMPLES,
    DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_MAX_RESPONSE_TIME_MS, DEFAULT_TIMEOUT_MS,
    DEFAULT_WARN_RESPONSE_TIME_MS, VALIDATOR_USER_AGENT,
};
