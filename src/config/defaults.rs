//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default per-attempt extraction timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default number of concurrent batch workers.
pub const CONCURRENCY: usize = 8;

/// Default directory holding reference catalogs.
pub const CATALOG_DIR: &str = "configs";

/// Default directory for generated files.
pub const OUTPUT_DIR: &str = "configs";

/// Default documentation URL template.
pub const URL_TEMPLATE: &str = crate::extractor::strategies::DEFAULT_URL_TEMPLATE;

/// Default `User-Agent` for documentation requests.
pub const USER_AGENT: &str = concat!("confscout/", env!("CARGO_PKG_VERSION"));

/// Default configuration file name written by `init`.
pub const CONFIG_FILE: &str = "confscout.toml";
