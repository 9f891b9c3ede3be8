//! Extraction from the user's existing configuration file.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::context::Context;
use crate::extractor::parse::{self, Settings};
use crate::extractor::{Strategy, StrategyError};
use crate::model::{ExtractedConfig, ExtractionSource};

const CONFIDENCE: f64 = 0.7;

#[derive(Clone, Copy)]
enum Format {
    Lines(fn(&str) -> Settings),
    Toml,
}

impl Format {
    fn parse(self, content: &str) -> Result<Settings, StrategyError> {
        match self {
            Self::Lines(parser) => Ok(parser(content)),
            Self::Toml => parse::toml_document(content).map_err(StrategyError::Parse),
        }
    }
}

#[derive(Clone, Copy)]
struct Candidate {
    path: &'static str,
    format_name: &'static str,
    format: Format,
}

const fn candidate(path: &'static str, format_name: &'static str, format: Format) -> Candidate {
    Candidate {
        path,
        format_name,
        format,
    }
}

const LOCATIONS: &[(&str, &[Candidate])] = &[
    (
        "ghostty",
        &[candidate(
            "~/.config/ghostty/config",
            "custom",
            Format::Lines(parse::ghostty),
        )],
    ),
    (
        "zed",
        &[candidate(
            "~/.config/zed/settings.json",
            "json",
            Format::Lines(parse::jsonc),
        )],
    ),
    (
        "alacritty",
        &[
            candidate("~/.config/alacritty/alacritty.toml", "toml", Format::Toml),
            candidate(
                "~/.config/alacritty/alacritty.yml",
                "yaml",
                Format::Lines(parse::yaml_sections),
            ),
        ],
    ),
    (
        "wezterm",
        &[
            candidate("~/.wezterm.lua", "lua", Format::Lines(parse::lua)),
            candidate(
                "~/.config/wezterm/wezterm.lua",
                "lua",
                Format::Lines(parse::lua),
            ),
        ],
    ),
    (
        "kitty",
        &[candidate(
            "~/.config/kitty/kitty.conf",
            "custom",
            Format::Lines(parse::whitespace_pairs),
        )],
    ),
    (
        "tmux",
        &[
            candidate("~/.tmux.conf", "custom", Format::Lines(parse::tmux_conf)),
            candidate(
                "~/.config/tmux/tmux.conf",
                "custom",
                Format::Lines(parse::tmux_conf),
            ),
        ],
    ),
    (
        "git",
        &[
            candidate("~/.gitconfig", "ini", Format::Lines(parse::gitconfig)),
            candidate(
                "~/.config/git/config",
                "ini",
                Format::Lines(parse::gitconfig),
            ),
        ],
    ),
    (
        "starship",
        &[candidate("~/.config/starship.toml", "toml", Format::Toml)],
    ),
    (
        "mise",
        &[candidate("~/.config/mise/config.toml", "toml", Format::Toml)],
    ),
];

fn candidates_for(app: &str) -> Option<&'static [Candidate]> {
    LOCATIONS
        .iter()
        .find(|(name, _)| *name == app)
        .map(|(_, candidates)| *candidates)
}

/// Expands a leading `~/` against `home`.
///
/// Paths without the prefix are returned unchanged; `None` if the prefix is
/// present but no home directory is known.
#[must_use]
pub fn expand_tilde(path: &str, home: Option<&Path>) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => home.map(|h| h.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

/// Reads settings from config files the user already has.
///
/// Only the keys present in the file are found, so the result is usually a
/// subset of what the application supports.
#[derive(Debug, Clone)]
pub struct FileStrategy {
    home: Option<PathBuf>,
}

impl FileStrategy {
    /// Creates a strategy rooted at the current user's home directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Resolves `~/` against `home` instead of the user's home directory.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl Default for FileStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Strategy for FileStrategy {
    fn name(&self) -> &str {
        "file"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn can_extract(&self, app: &str) -> bool {
        candidates_for(app).is_some()
    }

    fn known_apps(&self) -> Vec<&str> {
        LOCATIONS.iter().map(|(app, _)| *app).collect()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        let candidates = candidates_for(app).ok_or(StrategyError::NotApplicable)?;
        let mut last_error = StrategyError::NoSettings;

        for candidate in candidates {
            let Some(path) = expand_tilde(candidate.path, self.home.as_deref()) else {
                last_error = StrategyError::Parse(format!(
                    "cannot expand {} without a home directory",
                    candidate.path
                ));
                continue;
            };

            let content = match ctx.run(tokio::fs::read_to_string(&path)).await? {
                Ok(content) => content,
                Err(source) if source.kind() == io::ErrorKind::NotFound => {
                    tracing::trace!(path = %path.display(), "config file not present");
                    last_error = StrategyError::Io { path, source };
                    continue;
                }
                Err(source) => return Err(StrategyError::Io { path, source }),
            };

            let settings = match candidate.format.parse(&content) {
                Ok(settings) if !settings.is_empty() => settings,
                Ok(_) => {
                    last_error = StrategyError::NoSettings;
                    continue;
                }
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "config file did not parse");
                    last_error = err;
                    continue;
                }
            };

            let mut config = ExtractedConfig::new(app, candidate.format_name)
                .with_config_path(candidate.path)
                .with_source(ExtractionSource::new(
                    "file",
                    path.display().to_string(),
                    CONFIDENCE,
                ));
            config.settings = settings;
            return Ok(config);
        }

        Err(last_error)
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
