//! Translation of catalogs into editable application configs.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value, json};

use super::{CatalogLoader, MappingError, ReferenceError, ReferenceManager};
use crate::model::{
    AppConfig, ConfigReference, ExtractedConfig, FieldConfig, FieldType, PresetConfig, Setting,
};

/// Translates a catalog setting into an editable field.
///
/// Types map one to one, except that a string setting with more than one
/// permitted value becomes a `choice` field. Unknown types become strings.
#[must_use]
pub fn field_for(setting: &Setting) -> FieldConfig {
    let mut field_type = FieldType::from(&setting.setting_type);
    if field_type == FieldType::String && setting.valid_values.len() > 1 {
        field_type = FieldType::Choice;
    }

    FieldConfig {
        field_type,
        values: setting.valid_values.clone(),
        default: setting.default_value.clone(),
        description: setting.description.clone(),
        path: setting.name.clone(),
    }
}

/// Adds a field for every setting whose key is missing from `config`.
///
/// Returns the number of fields added.
fn add_missing_fields<'a>(
    config: &mut AppConfig,
    settings: impl IntoIterator<Item = (&'a String, &'a Setting)>,
) -> usize {
    let mut added = 0;
    for (key, setting) in settings {
        if !config.fields.contains_key(key) {
            config.fields.insert(key.clone(), field_for(setting));
            added += 1;
        }
    }
    added
}

fn fill_metadata(config: &mut AppConfig, app: &str, path: &str, format: &str) {
    if config.path.is_empty() {
        config.path = path.to_string();
    }
    if config.format.is_empty() {
        config.format = format.to_string();
    }
    if config.description.is_empty() {
        config.description = format!("Configuration for {app} (enhanced with reference)");
    }
}

fn preset(name: &str, description: &str, values: IndexMap<String, Value>) -> PresetConfig {
    PresetConfig {
        name: name.to_string(),
        description: description.to_string(),
        values,
    }
}

fn values<const N: usize>(pairs: [(&str, Value); N]) -> IndexMap<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Hand-written presets for applications with well-known setups.
fn app_presets(app: &str) -> Vec<(&'static str, PresetConfig)> {
    match app.to_lowercase().as_str() {
        "ghostty" => vec![
            (
                "minimal",
                preset(
                    "Minimal Terminal",
                    "Clean, distraction-free terminal setup",
                    values([
                        ("window-decoration", json!(false)),
                        ("window-padding", json!(0)),
                        ("cursor-blink", json!(false)),
                        ("background-opacity", json!(1.0)),
                    ]),
                ),
            ),
            (
                "developer",
                preset(
                    "Developer Setup",
                    "Optimized for development work",
                    values([
                        ("font-family", json!("JetBrains Mono")),
                        ("font-size", json!(14)),
                        ("theme", json!("dark")),
                        ("shell-integration", json!(true)),
                        ("scrollback-limit", json!(50000)),
                        ("copy-on-select", json!(true)),
                        ("confirm-close-surface", json!(true)),
                    ]),
                ),
            ),
        ],
        "zed" => vec![
            (
                "vscode",
                preset(
                    "VS Code Style",
                    "Configuration similar to VS Code defaults",
                    values([
                        ("base_keymap", json!("VSCode")),
                        ("buffer_font_size", json!(14)),
                        ("ui_font_size", json!(14)),
                        ("tab_size", json!(4)),
                        ("hard_tabs", json!(false)),
                        ("vim_mode", json!(false)),
                        ("autosave", json!("on_focus_change")),
                        ("format_on_save", json!(true)),
                    ]),
                ),
            ),
            (
                "vim",
                preset(
                    "Vim Style",
                    "Configuration for Vim users",
                    values([
                        ("vim_mode", json!(true)),
                        ("base_keymap", json!("None")),
                        ("buffer_font_size", json!(12)),
                        ("hard_tabs", json!(true)),
                        ("tab_size", json!(8)),
                        ("autosave", json!("off")),
                        ("show_whitespaces", json!("selection")),
                    ]),
                ),
            ),
        ],
        _ => Vec::new(),
    }
}

/// Builds [`AppConfig`]s from catalogs and merges catalogs into existing ones.
///
/// Shares its [`ReferenceManager`] so catalogs are loaded once per process.
#[derive(Debug)]
pub struct ConfigMapper<L> {
    manager: Arc<ReferenceManager<L>>,
}

impl<L> Clone for ConfigMapper<L> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<L: CatalogLoader> ConfigMapper<L> {
    /// Creates a mapper over `manager`.
    #[must_use]
    pub const fn new(manager: Arc<ReferenceManager<L>>) -> Self {
        Self { manager }
    }

    /// Returns the shared manager.
    #[must_use]
    pub const fn manager(&self) -> &Arc<ReferenceManager<L>> {
        &self.manager
    }

    /// Generates a complete application config from the catalog for `app`.
    ///
    /// Every setting becomes a field. A `default` preset collects all declared
    /// defaults, and a few applications get extra hand-written presets.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the catalog cannot be loaded.
    pub fn map_reference_to_app_config(&self, app: &str) -> Result<AppConfig, ReferenceError> {
        let reference = self.manager.get_reference(app)?;
        Ok(build_app_config(&reference))
    }

    /// Adds catalog settings missing from `existing`.
    ///
    /// Fields already in `existing` are never changed, and path, format and
    /// description are only filled in when empty. Without a catalog for `app`
    /// the config is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if a catalog exists but cannot be read.
    pub fn merge_with_app_config(
        &self,
        app: &str,
        existing: &AppConfig,
    ) -> Result<AppConfig, ReferenceError> {
        let reference = match self.manager.get_reference(app) {
            Ok(reference) => reference,
            Err(err) if err.is_not_found() => {
                tracing::debug!(app, "no catalog to merge");
                return Ok(existing.clone());
            }
            Err(err) => return Err(err),
        };

        let mut merged = existing.clone();
        let added = add_missing_fields(&mut merged, &reference.settings);
        fill_metadata(
            &mut merged,
            &reference.app_name,
            &reference.config_path,
            &reference.config_type,
        );
        tracing::debug!(app, added, "merged catalog into app config");
        Ok(merged)
    }

    /// Checks that every catalog setting maps to a field of a compatible type.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found, or [`MappingError::Reference`]
    /// if the catalog cannot be loaded.
    pub fn validate_reference_mapping(&self, app: &str) -> Result<(), MappingError> {
        let reference = self.manager.get_reference(app)?;
        let config = build_app_config(&reference);
        check_mapping(&reference, &config)
    }
}

/// Adds extracted settings missing from `existing`, with the same rules as
/// [`ConfigMapper::merge_with_app_config`].
#[must_use]
pub fn merge_extracted(existing: &AppConfig, extracted: &ExtractedConfig) -> AppConfig {
    let mut merged = existing.clone();
    if merged.name.is_empty() {
        merged.name.clone_from(&extracted.app);
    }
    add_missing_fields(&mut merged, &extracted.settings);
    let reference = extracted.to_reference();
    fill_metadata(
        &mut merged,
        &extracted.app,
        &reference.config_path,
        &reference.config_type,
    );
    merged
}

fn build_app_config(reference: &ConfigReference) -> AppConfig {
    let mut config = AppConfig::new(&reference.app_name);
    config.path.clone_from(&reference.config_path);
    config.format.clone_from(&reference.config_type);
    config.description = format!(
        "Auto-generated from reference config for {}",
        reference.app_name
    );
    add_missing_fields(&mut config, &reference.settings);

    let defaults: IndexMap<String, Value> = reference
        .settings
        .iter()
        .filter_map(|(key, s)| s.default_value.clone().map(|v| (key.clone(), v)))
        .collect();
    if !defaults.is_empty() {
        config.presets.insert(
            "default".to_string(),
            preset(
                "Default Settings",
                "Default configuration values from reference",
                defaults,
            ),
        );
    }
    for (key, preset) in app_presets(&reference.app_name) {
        config.presets.insert(key.to_string(), preset);
    }
    config
}

fn check_mapping(reference: &ConfigReference, config: &AppConfig) -> Result<(), MappingError> {
    for (key, setting) in &reference.settings {
        let field = config
            .fields
            .get(key)
            .ok_or_else(|| MappingError::Unmapped {
                setting: key.clone(),
            })?;

        let expected = FieldType::from(&setting.setting_type);
        let compatible = field.field_type == expected
            || (field.field_type == FieldType::Choice && expected == FieldType::String);
        if !compatible {
            return Err(MappingError::TypeMismatch {
                setting: key.clone(),
                expected: expected.to_string(),
                actual: field.field_type.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
