//! Data model shared by the extraction pipeline and the reference catalogs.
//!
//! Settings maps are [`IndexMap`]s so that iteration follows the order in
//! which a catalog file (or an extraction parser) declared them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Declared type of a setting.
///
/// Unrecognised type names are kept verbatim in [`SettingType::Other`] so that
/// catalogs round-trip without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SettingType {
    /// Free-form text.
    #[default]
    String,
    /// Integer or floating-point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Sequence of values.
    Array,
    /// String-keyed mapping.
    Object,
    /// Any other type name (`color`, `key`, ...).
    Other(String),
}

impl SettingType {
    /// Returns the canonical type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for SettingType {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for SettingType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<SettingType> for String {
    fn from(kind: SettingType) -> Self {
        match kind {
            SettingType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configurable option of an application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key, unique within its catalog.
    #[serde(default)]
    pub name: String,

    /// Declared value type.
    #[serde(rename = "type", default)]
    pub setting_type: SettingType,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Value used when the user sets nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Example value for documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Permitted values; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,

    /// Whether the application refuses to start without this setting.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Grouping used by editors and search.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
}

impl Setting {
    /// Creates a setting with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, setting_type: SettingType) -> Self {
        Self {
            name: name.into(),
            setting_type,
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the permitted values.
    #[must_use]
    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Curated catalog of the settings of one application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigReference {
    /// Application name.
    #[serde(default)]
    pub app_name: String,

    /// Location of the application's own config file.
    #[serde(default)]
    pub config_path: String,

    /// Format of the application's own config file (`json`, `toml`, ...).
    #[serde(default)]
    pub config_type: String,

    /// When the catalog was loaded or generated.
    ///
    /// Values that are not a recognisable timestamp decode as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,

    /// Settings keyed by name, in catalog order.
    #[serde(default)]
    pub settings: IndexMap<String, Setting>,
}

impl ConfigReference {
    /// Fills in setting names that the catalog left implicit in the map key.
    pub fn normalize(&mut self) {
        for (key, setting) in &mut self.settings {
            if setting.name.is_empty() {
                setting.name.clone_from(key);
            }
        }
    }

    /// Adds every setting from `other` whose key is absent here.
    ///
    /// Returns the number of settings added.
    pub fn merge_missing(&mut self, other: &Self) -> usize {
        let mut added = 0;
        for (key, setting) in &other.settings {
            if !self.settings.contains_key(key) {
                self.settings.insert(key.clone(), setting.clone());
                added += 1;
            }
        }
        added
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) or a bare date
/// (midnight UTC).
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Provenance of an extraction result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionSource {
    /// Strategy that produced the result (`cli`, `docs`, ...).
    pub method: String,

    /// Concrete location (command line, URL, file path).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,

    /// Confidence score in `[0, 1]`.
    pub confidence: f64,
}

impl ExtractionSource {
    /// Creates a source; the confidence is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(method: impl Into<String>, location: impl Into<String>, confidence: f64) -> Self {
        Self {
            method: method.into(),
            location: location.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Settings discovered for one application by one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedConfig {
    /// Application the settings belong to.
    pub app: String,

    /// Location of the application's config file, if known.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config_path: String,

    /// Format of the application's config file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    /// Discovered settings, in discovery order.
    pub settings: IndexMap<String, Setting>,

    /// Where the settings came from.
    pub source: ExtractionSource,

    /// When the extraction finished.
    pub timestamp: DateTime<Utc>,
}

impl ExtractedConfig {
    /// Creates an empty result for `app`.
    ///
    /// The timestamp starts at the wall clock; [`Extractor`](crate::extractor::Extractor)
    /// restamps accepted results from its injected clock.
    #[must_use]
    pub fn new(app: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            config_path: String::new(),
            format: format.into(),
            settings: IndexMap::new(),
            source: ExtractionSource::default(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the provenance.
    #[must_use]
    pub fn with_source(mut self, source: ExtractionSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the config file location.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Inserts or replaces a setting keyed by its name.
    pub fn insert(&mut self, setting: Setting) {
        self.settings.insert(setting.name.clone(), setting);
    }

    /// Returns true if no settings were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Converts the result into a catalog.
    #[must_use]
    pub fn to_reference(&self) -> ConfigReference {
        let config_path = if self.config_path.is_empty() {
            format!("~/.config/{}/config", self.app)
        } else {
            self.config_path.clone()
        };
        let config_type = if self.format.is_empty() {
            "custom".to_string()
        } else {
            self.format.clone()
        };

        ConfigReference {
            app_name: self.app.clone(),
            config_path,
            config_type,
            last_updated: Some(self.timestamp),
            settings: self.settings.clone(),
        }
    }
}

/// Type of an editable field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// One value out of a fixed list.
    Choice,
    /// Free-form text.
    #[default]
    String,
    /// Numeric value.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Sequence of values.
    Array,
    /// Nested mapping.
    Object,
    /// Any other type name kept from an existing config.
    Other(String),
}

impl FieldType {
    /// Returns the canonical type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Choice => "choice",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "choice" => Self::Choice,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            _ => Self::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        match kind {
            FieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl From<&SettingType> for FieldType {
    fn from(kind: &SettingType) -> Self {
        match kind {
            SettingType::Number => Self::Number,
            SettingType::Boolean => Self::Boolean,
            SettingType::Array => Self::Array,
            SettingType::Object => Self::Object,
            SettingType::String | SettingType::Other(_) => Self::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable field of an application config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field type.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Choices for `choice` fields (or hints for others).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Description shown to the user.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Key path inside the application's config file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// Named bundle of field values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    /// Display name.
    pub name: String,

    /// What the preset is for.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Field values applied by the preset.
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}

/// Editable configuration model of one application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name.
    pub name: String,

    /// Location of the application's config file.
    #[serde(default)]
    pub path: String,

    /// Format of the application's config file.
    #[serde(default)]
    pub format: String,

    /// Description shown to the user.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Editable fields keyed by setting key.
    #[serde(default)]
    pub fields: IndexMap<String, FieldConfig>,

    /// Presets keyed by identifier.
    #[serde(default)]
    pub presets: IndexMap<String, PresetConfig>,

    /// Commands run around config changes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hooks: BTreeMap<String, String>,

    /// Environment variables exported to hooks.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl AppConfig {
    /// Creates an empty config for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Outcome of validating one value against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True if the value is acceptable.
    pub valid: bool,

    /// Why the value was rejected, in check order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Similar setting names when the setting itself is unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Records a failure.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Converts the result into a `Result` for callers that want `?`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the result is not valid.
    pub fn into_result(self, setting: &str, value: &Value) -> Result<(), ValidationError> {
        if self.valid {
            return Ok(());
        }
        Err(ValidationError {
            setting: setting.to_string(),
            value: display_value(value),
            errors: self.errors,
            suggestions: self.suggestions,
        })
    }
}

/// A rejected value, with the reasons and any name suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value} for '{setting}': {}{}", .errors.join("; "), suggestion_hint(.suggestions))]
pub struct ValidationError {
    /// Setting that was validated.
    pub setting: String,
    /// Offending value, rendered for display.
    pub value: String,
    /// Reasons for rejection.
    pub errors: Vec<String>,
    /// Similar setting names.
    pub suggestions: Vec<String>,
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Renders a value the way it is compared against `valid_values`.
///
/// Strings are taken verbatim. Whole-valued floats below `1e21` drop their
/// fraction, so `1.0` renders as `1`. Everything else uses its JSON rendering.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
