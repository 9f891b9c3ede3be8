//! Hand-curated fallback settings.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::Context;
use crate::extractor::parse::infer_category;
use crate::extractor::{Strategy, StrategyError};
use crate::model::{ExtractedConfig, ExtractionSource, Setting, SettingType};

const CONFIDENCE: f64 = 0.6;

struct Entry {
    name: &'static str,
    setting_type: SettingType,
    default: Option<Value>,
    description: &'static str,
    category: Option<&'static str>,
}

fn entry(
    name: &'static str,
    setting_type: SettingType,
    default: Option<Value>,
    description: &'static str,
) -> Entry {
    Entry {
        name,
        setting_type,
        default,
        description,
        category: None,
    }
}

fn tmux() -> Vec<Entry> {
    vec![
        Entry {
            category: Some("keybindings"),
            ..entry(
                "prefix",
                SettingType::String,
                Some("C-b".into()),
                "The prefix key",
            )
        },
        entry(
            "base-index",
            SettingType::Number,
            Some(0.into()),
            "Starting index for window numbers",
        ),
        entry(
            "mouse",
            SettingType::Boolean,
            Some(false.into()),
            "Enable mouse support",
        ),
        entry(
            "history-limit",
            SettingType::Number,
            Some(2000.into()),
            "Maximum number of lines in window history",
        ),
        entry(
            "status",
            SettingType::Boolean,
            Some(true.into()),
            "Show the status line",
        ),
    ]
}

fn git() -> Vec<Entry> {
    vec![
        entry("user.name", SettingType::String, None, "Your full name"),
        entry("user.email", SettingType::String, None, "Your email address"),
        entry(
            "core.editor",
            SettingType::String,
            Some("vim".into()),
            "Default editor for commit messages",
        ),
        entry(
            "init.defaultBranch",
            SettingType::String,
            Some("main".into()),
            "Default branch name for new repositories",
        ),
    ]
}

/// `(app, config path, format)`.
const APPS: &[(&str, &str, &str)] = &[
    ("tmux", "~/.tmux.conf", "custom"),
    ("git", "~/.gitconfig", "ini"),
];

/// Last-resort strategy with a small set of well-known settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinStrategy;

#[async_trait]
impl Strategy for BuiltinStrategy {
    fn name(&self) -> &str {
        "builtin"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn can_extract(&self, app: &str) -> bool {
        APPS.iter().any(|(name, _, _)| *name == app)
    }

    fn known_apps(&self) -> Vec<&str> {
        APPS.iter().map(|(app, _, _)| *app).collect()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        ctx.check()?;
        let (_, path, format) = APPS
            .iter()
            .find(|(name, _, _)| *name == app)
            .ok_or(StrategyError::NotApplicable)?;
        let entries = match app {
            "tmux" => tmux(),
            "git" => git(),
            _ => return Err(StrategyError::NotApplicable),
        };

        let mut config = ExtractedConfig::new(app, *format)
            .with_config_path(*path)
            .with_source(ExtractionSource::new("builtin", "builtin", CONFIDENCE));
        for e in entries {
            let category = e.category.unwrap_or_else(|| infer_category(e.name));
            let mut setting = Setting::new(e.name, e.setting_type)
                .with_description(e.description)
                .with_category(category);
            setting.default_value = e.default;
            config.insert(setting);
        }
        Ok(config)
    }
}
