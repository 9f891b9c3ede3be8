//! Configuration layer for confscout.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! `batch --workers` overrides `extractor.concurrency` for that run only.
//!
//! # TOML-Only Options
//!
//! The output directory and the `[docs]` settings (`url_template`,
//! `user_agent`) are only configurable through the file. Per-command
//! `--output` and `--output-dir` flags override the output directory for a
//! single run.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command, MethodArg};
pub use error::ConfigError;
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
