//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderValue;

use crate::extractor::strategies::{UrlParts, UrlTemplate};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Per-attempt extraction timeout
    pub timeout: Duration,

    /// Concurrent batch workers
    pub concurrency: usize,

    /// Directory holding reference catalogs
    pub catalog_dir: PathBuf,

    /// Directory for generated catalogs
    pub output_dir: PathBuf,

    /// Compiled documentation URL template
    pub url_template: UrlTemplate,

    /// `User-Agent` for documentation requests
    pub user_agent: String,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ timeout: {}s, concurrency: {}, catalog_dir: {}, output_dir: {}, \
             url_template: {}, user_agent: {} }}",
            self.timeout.as_secs(),
            self.concurrency,
            self.catalog_dir.display(),
            self.output_dir.display(),
            self.url_template.as_str(),
            self.user_agent,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over [`defaults`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timeout is zero
    /// - The worker count is zero
    /// - The URL template does not compile or does not render a URL
    /// - The user agent is not a valid header value
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let timeout = Self::resolve_timeout(cli, toml)?;
        let concurrency = Self::resolve_concurrency(cli, toml)?;

        let catalog_dir = cli
            .catalog_dir
            .clone()
            .or_else(|| toml.and_then(|t| t.catalog.dir.clone()))
            .unwrap_or_else(|| PathBuf::from(defaults::CATALOG_DIR));

        let output_dir = toml
            .and_then(|t| t.output.dir.clone())
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_DIR));

        let url_template = Self::resolve_url_template(toml)?;
        let user_agent = Self::resolve_user_agent(toml)?;

        Ok(Self {
            timeout,
            concurrency,
            catalog_dir,
            output_dir,
            url_template,
            user_agent,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.extractor.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_concurrency(cli: &Cli, toml: Option<&TomlConfig>) -> Result<usize, ConfigError> {
        let value = cli
            .batch_workers()
            .or_else(|| toml.and_then(|t| t.extractor.concurrency))
            .unwrap_or(defaults::CONCURRENCY);

        if value == 0 {
            return Err(ConfigError::InvalidConcurrency { value });
        }
        Ok(value)
    }

    fn resolve_url_template(toml: Option<&TomlConfig>) -> Result<UrlTemplate, ConfigError> {
        let source = toml
            .and_then(|t| t.docs.url_template.as_deref())
            .unwrap_or(defaults::URL_TEMPLATE);

        let invalid = |reason: String| ConfigError::InvalidTemplate { reason };
        let template = UrlTemplate::new(source).map_err(|e| invalid(e.to_string()))?;

        // Render once so unknown variables and non-URLs fail at startup
        template
            .url(&UrlParts {
                owner: "owner",
                repo: "repo",
                branch: "main",
                path: "README.md",
            })
            .map_err(|e| invalid(e.to_string()))?;

        Ok(template)
    }

    fn resolve_user_agent(toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let agent = toml
            .and_then(|t| t.docs.user_agent.as_deref())
            .unwrap_or(defaults::USER_AGENT);

        HeaderValue::from_str(agent).map_err(|e| ConfigError::InvalidUserAgent {
            value: agent.to_string(),
            reason: e.to_string(),
        })?;
        Ok(agent.to_string())
    }

    /// Default catalog output path for `app`.
    #[must_use]
    pub fn output_path(&self, app: &str) -> PathBuf {
        self.output_dir.join(format!("{app}.yaml"))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
