//! Extraction through an application's own self-documentation command.

use std::time::Duration;

use async_trait::async_trait;

use super::runner::CommandRunner;
use super::run_command;
use crate::context::Context;
use crate::extractor::parse::{self, Settings};
use crate::extractor::{Strategy, StrategyError};
use crate::model::{ExtractedConfig, ExtractionSource};

/// A command that prints an application's settings.
#[derive(Clone, Copy)]
struct CliCommand {
    app: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    timeout: Duration,
    confidence: f64,
    format: &'static str,
    config_path: &'static str,
    parser: fn(&str) -> Settings,
}

impl CliCommand {
    fn command_line(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const COMMANDS: &[CliCommand] = &[
    CliCommand {
        app: "ghostty",
        program: "ghostty",
        args: &["+show-config", "--default", "--docs"],
        timeout: Duration::from_secs(10),
        confidence: 0.95,
        format: "custom",
        config_path: "~/.config/ghostty/config",
        parser: parse::ghostty,
    },
    CliCommand {
        app: "zed",
        program: "zed",
        args: &["--print-config"],
        timeout: Duration::from_secs(5),
        confidence: 0.90,
        format: "json",
        config_path: "~/.config/zed/settings.json",
        parser: parse::jsonc,
    },
    CliCommand {
        app: "wezterm",
        program: "wezterm",
        args: &["show-config"],
        timeout: Duration::from_secs(5),
        confidence: 0.90,
        format: "lua",
        config_path: "~/.config/wezterm/wezterm.lua",
        parser: parse::lua,
    },
    CliCommand {
        app: "tmux",
        program: "tmux",
        args: &["show-options", "-g"],
        timeout: Duration::from_secs(3),
        confidence: 0.85,
        format: "custom",
        config_path: "~/.tmux.conf",
        parser: parse::tmux_options,
    },
    CliCommand {
        app: "git",
        program: "git",
        args: &["config", "--list", "--show-origin"],
        timeout: Duration::from_secs(3),
        confidence: 0.90,
        format: "ini",
        config_path: "~/.gitconfig",
        parser: parse::git_list,
    },
];

fn command_for(app: &str) -> Option<&'static CliCommand> {
    COMMANDS.iter().find(|c| c.app == app)
}

/// Runs the application's configuration dump command and parses its output.
///
/// This is the most authoritative source, so it has the highest priority.
#[derive(Debug, Clone, Default)]
pub struct CliStrategy<R> {
    runner: R,
}

impl<R: CommandRunner> CliStrategy<R> {
    /// Creates a strategy that runs commands through `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: CommandRunner + 'static> Strategy for CliStrategy<R> {
    fn name(&self) -> &str {
        "cli"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_extract(&self, app: &str) -> bool {
        command_for(app).is_some()
    }

    fn known_apps(&self) -> Vec<&str> {
        COMMANDS.iter().map(|c| c.app).collect()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        let command = command_for(app).ok_or(StrategyError::NotApplicable)?;
        let args: Vec<String> = command.args.iter().map(|a| (*a).to_string()).collect();

        let output = run_command(&self.runner, ctx, command.timeout, command.program, &args).await?;
        let settings = (command.parser)(&output.text());
        if settings.is_empty() {
            return Err(StrategyError::NoSettings);
        }

        tracing::debug!(app, count = settings.len(), "parsed command output");
        let mut config = ExtractedConfig::new(app, command.format)
            .with_config_path(command.config_path)
            .with_source(ExtractionSource::new(
                "cli",
                command.command_line(),
                command.confidence,
            ));
        config.settings = settings;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
