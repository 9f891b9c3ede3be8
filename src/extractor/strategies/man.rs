//! Extraction from installed manual pages.

use std::time::Duration;

use async_trait::async_trait;

use super::run_command;
use super::runner::CommandRunner;
use crate::context::Context;
use crate::extractor::parse;
use crate::extractor::{Strategy, StrategyError};
use crate::model::{ExtractedConfig, ExtractionSource};

const CONFIDENCE: f64 = 0.6;
const MAN_TIMEOUT: Duration = Duration::from_secs(10);

/// `(app, manual section, page)`.
const PAGES: &[(&str, Option<&str>, &str)] = &[
    ("tmux", None, "tmux"),
    ("git", None, "git-config"),
    ("alacritty", Some("5"), "alacritty"),
    ("kitty", Some("5"), "kitty.conf"),
    ("neovim", None, "nvim"),
    ("zsh", None, "zshoptions"),
    ("ssh", Some("5"), "ssh_config"),
];

fn page_for(app: &str) -> Option<(Option<&'static str>, &'static str)> {
    PAGES
        .iter()
        .find(|(name, _, _)| *name == app)
        .map(|&(_, section, page)| (section, page))
}

/// Renders a manual page as plain text and parses its option entries.
#[derive(Debug, Clone, Default)]
pub struct ManStrategy<R> {
    runner: R,
}

impl<R: CommandRunner> ManStrategy<R> {
    /// Creates a strategy that runs `man` through `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: CommandRunner + 'static> Strategy for ManStrategy<R> {
    fn name(&self) -> &str {
        "man"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn can_extract(&self, app: &str) -> bool {
        page_for(app).is_some()
    }

    fn known_apps(&self) -> Vec<&str> {
        PAGES.iter().map(|(app, _, _)| *app).collect()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        let (section, page) = page_for(app).ok_or(StrategyError::NotApplicable)?;

        let mut args = vec!["-P".to_string(), "cat".to_string()];
        args.extend(section.map(str::to_string));
        args.push(page.to_string());

        let output = run_command(&self.runner, ctx, MAN_TIMEOUT, "man", &args).await?;
        let settings = parse::man_page(&output.stdout);
        if settings.is_empty() {
            return Err(StrategyError::NoSettings);
        }

        let location = match section {
            Some(section) => format!("man {section} {page}"),
            None => format!("man {page}"),
        };
        let mut config = ExtractedConfig::new(app, "custom")
            .with_source(ExtractionSource::new("man", location, CONFIDENCE));
        config.settings = settings;
        Ok(config)
    }
}
