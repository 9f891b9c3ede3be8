//! Extraction from an application's documentation repository.

use std::fmt;

use async_trait::async_trait;
use handlebars::Handlebars;
use serde::Serialize;

use crate::context::Context;
use crate::extractor::parse::{self, Settings};
use crate::extractor::{Strategy, StrategyError};
use crate::fetch::{HttpClient, HttpError, HttpRequest};
use crate::model::{ExtractedConfig, ExtractionSource};

/// Default location of raw repository files.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://raw.githubusercontent.com/{{owner}}/{{repo}}/{{branch}}/{{path}}";

/// Branches tried for every candidate file, in order.
const BRANCHES: &[&str] = &["main", "master"];

const TEMPLATE_NAME: &str = "url";

/// Variables available to the URL template.
#[derive(Debug, Clone, Serialize)]
pub struct UrlParts<'a> {
    /// Repository owner.
    pub owner: &'a str,
    /// Repository name.
    pub repo: &'a str,
    /// Branch name.
    pub branch: &'a str,
    /// File path inside the repository.
    pub path: &'a str,
}

/// Compiled Handlebars template that turns [`UrlParts`] into a URL.
///
/// Rendering is strict: a template that references an unknown variable
/// fails instead of producing an empty segment. Values are not HTML-escaped.
#[derive(Clone)]
pub struct UrlTemplate {
    source: String,
    registry: Handlebars<'static>,
}

impl UrlTemplate {
    /// Compiles `template`.
    ///
    /// # Errors
    ///
    /// Returns the Handlebars error if the template has invalid syntax.
    pub fn new(template: impl Into<String>) -> Result<Self, handlebars::TemplateError> {
        let source = template.into();
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, &source)?;
        Ok(Self { source, registry })
    }

    /// Returns the template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Renders the template and parses the result as a URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if rendering fails or the output
    /// is not a valid URL.
    pub fn url(&self, parts: &UrlParts<'_>) -> Result<url::Url, HttpError> {
        let rendered = self
            .registry
            .render(TEMPLATE_NAME, parts)
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        url::Url::parse(&rendered).map_err(|e| HttpError::InvalidUrl(format!("{rendered}: {e}")))
    }
}

impl fmt::Debug for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlTemplate").field(&self.source).finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct DocSource {
    app: &'static str,
    owner: &'static str,
    repo: &'static str,
    paths: &'static [&'static str],
    confidence: f64,
    format: &'static str,
    config_path: &'static str,
}

const SOURCES: &[DocSource] = &[
    DocSource {
        app: "zed",
        owner: "zed-industries",
        repo: "zed",
        paths: &["assets/settings/default.json"],
        confidence: 0.85,
        format: "json",
        config_path: "~/.config/zed/settings.json",
    },
    DocSource {
        app: "alacritty",
        owner: "alacritty",
        repo: "alacritty",
        paths: &["alacritty.yml", "extra/alacritty.yml"],
        confidence: 0.80,
        format: "yaml",
        config_path: "~/.config/alacritty/alacritty.yml",
    },
    DocSource {
        app: "wezterm",
        owner: "wez",
        repo: "wezterm",
        paths: &["docs/config/lua/config/index.md"],
        confidence: 0.75,
        format: "lua",
        config_path: "~/.config/wezterm/wezterm.lua",
    },
    DocSource {
        app: "neovim",
        owner: "neovim",
        repo: "neovim",
        paths: &["runtime/doc/options.txt"],
        confidence: 0.70,
        format: "lua",
        config_path: "~/.config/nvim/init.lua",
    },
    DocSource {
        app: "tmux",
        owner: "tmux",
        repo: "tmux",
        paths: &["options-table.c", "tmux.1"],
        confidence: 0.65,
        format: "custom",
        config_path: "~/.tmux.conf",
    },
];

fn source_for(app: &str) -> Option<&'static DocSource> {
    SOURCES.iter().find(|s| s.app == app)
}

/// Picks the parser for a documentation file by its extension.
fn parser_for(path: &str) -> fn(&str) -> Settings {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => parse::jsonc,
        Some("yml" | "yaml") => parse::yaml_sections,
        Some("md") => parse::markdown,
        Some("c") => parse::c_option_table,
        Some("txt") => parse::vimdoc,
        Some("1") => parse::mdoc,
        _ => parse::whitespace_pairs,
    }
}

/// Downloads reference files from the application's source repository.
#[derive(Debug, Clone)]
pub struct DocsStrategy<C> {
    client: C,
    template: UrlTemplate,
    user_agent: String,
}

impl<C: HttpClient> DocsStrategy<C> {
    /// Creates a strategy that fetches through `client`.
    #[must_use]
    pub fn new(client: C, template: UrlTemplate, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            template,
            user_agent: user_agent.into(),
        }
    }

    /// Fetches one candidate file and parses it.
    async fn fetch(
        &self,
        ctx: &Context,
        source: &DocSource,
        path: &str,
        branch: &str,
    ) -> Result<(url::Url, Settings), StrategyError> {
        let url = self.template.url(&UrlParts {
            owner: source.owner,
            repo: source.repo,
            branch,
            path,
        })?;
        let request = HttpRequest::get(url.clone()).with_user_agent(&self.user_agent);

        let response = ctx.run(self.client.request(request)).await??;
        if !response.is_success() {
            return Err(StrategyError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let settings = parser_for(path)(&response.text());
        if settings.is_empty() {
            return Err(StrategyError::NoSettings);
        }
        Ok((url, settings))
    }
}

#[async_trait]
impl<C: HttpClient + 'static> Strategy for DocsStrategy<C> {
    fn name(&self) -> &str {
        "docs"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn can_extract(&self, app: &str) -> bool {
        source_for(app).is_some()
    }

    fn known_apps(&self) -> Vec<&str> {
        SOURCES.iter().map(|s| s.app).collect()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        let source = source_for(app).ok_or(StrategyError::NotApplicable)?;
        let mut last_error = StrategyError::NoSettings;

        for &path in source.paths {
            for &branch in BRANCHES {
                match self.fetch(ctx, source, path, branch).await {
                    Ok((url, settings)) => {
                        tracing::debug!(app, %url, count = settings.len(), "parsed documentation");
                        let mut config = ExtractedConfig::new(app, source.format)
                            .with_config_path(source.config_path)
                            .with_source(ExtractionSource::new(
                                "docs",
                                url.as_str(),
                                source.confidence,
                            ));
                        config.settings = settings;
                        return Ok(config);
                    }
                    Err(err @ StrategyError::Interrupted(_)) => return Err(err),
                    Err(err) => {
                        tracing::debug!(app, path, branch, error = %err, "documentation candidate failed");
                        last_error = err;
                    }
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
#[path = "docs_tests.rs"]
mod tests;
