//! Run configuration
//!
//! The configuration is assembled exactly once at process start — from the
//! environment in the binary, or via `with_*` setters in tests — and then
//! passed by reference into every component.

mod env;
mod types;

pub use types::ValidationConfig;
