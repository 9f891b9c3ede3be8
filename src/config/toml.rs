//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Extraction tuning
    #[serde(default)]
    pub extractor: ExtractorSection,

    /// Reference catalog location
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Generated file location
    #[serde(default)]
    pub output: OutputSection,

    /// Documentation fetching
    #[serde(default)]
    pub docs: DocsSection,
}

/// Extraction tuning section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorSection {
    /// Per-attempt timeout in seconds
    pub timeout: Option<u64>,

    /// Concurrent batch workers
    pub concurrency: Option<usize>,
}

/// Reference catalog section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    /// Directory holding `<app>.yaml` catalogs
    pub dir: Option<PathBuf>,
}

/// Output section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Directory for generated catalogs
    pub dir: Option<PathBuf>,
}

/// Documentation fetching section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocsSection {
    /// Handlebars template producing raw file URLs
    pub url_template: Option<String>,

    /// `User-Agent` header for requests
    pub user_agent: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# confscout configuration file

[extractor]
# Per-attempt extraction timeout in seconds (default: 30)
# Can be overridden by --timeout
timeout = 30

# Concurrent workers for batch extraction (default: 8)
# Can be overridden by `batch --workers`
concurrency = 8

[catalog]
# Directory holding reference catalogs named <app>.yaml, <app>.yml or <app>.json
# Can be overridden by --catalog-dir
dir = "configs"

[output]
# Directory for catalogs written by `extract` and `batch`
dir = "configs"

[docs]
# Handlebars template for documentation file URLs
# Available variables: {{owner}}, {{repo}}, {{branch}}, {{path}}
# url_template = "https://raw.githubusercontent.com/{{owner}}/{{repo}}/{{branch}}/{{path}}"

# User-Agent header sent with documentation requests
# user_agent = "confscout"
"#
    .to_string()
}
