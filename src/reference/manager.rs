//! Cached catalog access, validation and search.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::{CatalogLoader, ReferenceError};
use crate::model::{ConfigReference, Setting, SettingType, ValidationResult, display_value};

/// Most name suggestions offered for an unknown setting.
const MAX_SUGGESTIONS: usize = 3;

/// Loads catalogs through a [`CatalogLoader`] and keeps them for the life of
/// the manager.
///
/// Catalogs are never reloaded; create a new manager to pick up changes.
#[derive(Debug)]
pub struct ReferenceManager<L> {
    loader: L,
    cache: RwLock<HashMap<String, Arc<ConfigReference>>>,
}

impl<L: CatalogLoader> ReferenceManager<L> {
    /// Creates a manager with an empty cache.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the underlying loader.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Returns the catalog for `app`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the catalog is not cached and cannot be
    /// loaded. Failures are not cached.
    pub fn get_reference(&self, app: &str) -> Result<Arc<ConfigReference>, ReferenceError> {
        if let Some(reference) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(app)
        {
            return Ok(Arc::clone(reference));
        }

        let loaded = Arc::new(self.loader.load_reference(app)?);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(app.to_string()).or_insert(loaded)))
    }

    /// Checks `value` against the catalog entry for `setting`.
    ///
    /// An unknown setting is invalid and comes with up to three similar names.
    /// A known setting must match its declared type and, if the catalog lists
    /// permitted values, be one of them.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the catalog cannot be loaded.
    pub fn validate_configuration(
        &self,
        app: &str,
        setting: &str,
        value: &Value,
    ) -> Result<ValidationResult, ReferenceError> {
        let reference = self.get_reference(app)?;

        let Some(entry) = reference.settings.get(setting) else {
            let mut result = ValidationResult::ok();
            result.fail(format!("Unknown setting: {setting}"));
            result.suggestions = similar_settings(&reference, setting);
            return Ok(result);
        };

        Ok(validate_setting(entry, value))
    }

    /// Returns every setting whose name, description or category contains
    /// `query`, ignoring case, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the catalog cannot be loaded.
    pub fn search_settings(&self, app: &str, query: &str) -> Result<Vec<Setting>, ReferenceError> {
        let reference = self.get_reference(app)?;
        let query = query.to_lowercase();

        Ok(reference
            .settings
            .values()
            .filter(|s| {
                s.name.to_lowercase().contains(&query)
                    || s.description.to_lowercase().contains(&query)
                    || s.category.to_lowercase().contains(&query)
            })
            .cloned()
            .collect())
    }

    /// Applications with a catalog available to the loader.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] if the catalog location cannot be listed.
    pub fn list_apps(&self) -> Result<Vec<String>, ReferenceError> {
        self.loader.available_apps()
    }
}

fn validate_setting(setting: &Setting, value: &Value) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if !type_matches(&setting.setting_type, value) {
        result.fail(format!(
            "Expected type {}, got {}",
            setting.setting_type,
            kind_name(value)
        ));
    }

    if !setting.valid_values.is_empty() {
        let rendered = display_value(value);
        if !setting.valid_values.contains(&rendered) {
            result.fail(format!(
                "Value must be one of: [{}]",
                setting.valid_values.join(", ")
            ));
        }
    }

    result
}

/// Unknown declared types accept anything.
fn type_matches(expected: &SettingType, value: &Value) -> bool {
    match expected {
        SettingType::String => value.is_string(),
        SettingType::Number => value.is_number(),
        SettingType::Boolean => value.is_boolean(),
        SettingType::Array => value.is_array(),
        SettingType::Object => value.is_object(),
        SettingType::Other(_) => true,
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Names that contain `name` or are contained in it, ignoring case.
fn similar_settings(reference: &ConfigReference, name: &str) -> Vec<String> {
    let target = name.to_lowercase();
    reference
        .settings
        .keys()
        .filter(|key| {
            let key = key.to_lowercase();
            key.contains(&target) || target.contains(&key)
        })
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
