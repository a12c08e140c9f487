//! nb2report version information.
//!
//! Exposed as a single constant so the CLI and the rendered summary footer agree on the value.

/// The nb2report version string (for example, `0.3.0`).
pub const NB2REPORT_VERSION: &str = env!("CARGO_PKG_VERSION");
