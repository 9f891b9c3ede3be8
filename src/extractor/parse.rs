//! Parsers that turn tool output, documentation and config files into settings.
//!
//! Every parser is lenient: lines it does not understand are skipped, and an
//! input with nothing recognisable yields an empty map. Deciding whether an
//! empty result is a failure is left to the caller.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value};

use crate::model::{Setting, SettingType};

/// Settings keyed by name, in the order the parser met them.
pub type Settings = IndexMap<String, Setting>;

static GHOSTTY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_-]+)\s*=\s*(.*)$").expect("GHOSTTY_LINE regex is invalid")
});

static JSON_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([^"]+)"\s*:\s*(.*)$"#).expect("JSON_MEMBER regex is invalid")
});

static LUA_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^config\.([A-Za-z_][\w.]*)\s*=\s*(.+)$").expect("LUA_ASSIGNMENT regex is invalid")
});

static TMUX_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:set|set-option|setw|set-window-option)\s+(?:-[a-zA-Z]+\s+)*([a-z@][\w-]*)\s*(.*)$")
        .expect("TMUX_SET regex is invalid")
});

static INI_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*([\w.-]+)(?:\s+"([^"]*)")?\s*\]$"#).expect("INI_SECTION regex is invalid")
});

static C_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.name\s*=\s*"([^"]+)""#).expect("C_NAME regex is invalid")
});

static C_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.type\s*=\s*OPTIONS_TABLE_([A-Z]+)").expect("C_TYPE regex is invalid")
});

static C_DEFAULT_NUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.default_num\s*=\s*(-?\d+)").expect("C_DEFAULT_NUM regex is invalid")
});

static C_DEFAULT_STR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.default_str\s*=\s*"((?:[^"\\]|\\.)*)""#).expect("C_DEFAULT_STR regex is invalid")
});

static C_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.text\s*=\s*"((?:[^"\\]|\\.)*)""#).expect("C_TEXT regex is invalid")
});

static VIMDOC_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^'([a-z][a-z0-9]*)'(?:\s+'[a-z0-9]+')*\s+(boolean|number|string)\b(.*)$")
        .expect("VIMDOC_HEADER regex is invalid")
});

static VIMDOC_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdefault:?\s+([^)]*)").expect("VIMDOC_DEFAULT regex is invalid")
});

static MDOC_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.It\s+(?:Xo\s+)?Ic\s+([a-z@][\w-]*)(?:\s+Ar\s+(\S+))?")
        .expect("MDOC_ITEM regex is invalid")
});

static MDOC_CHOICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.Op\s+Ic\s+(.+)$").expect("MDOC_CHOICE regex is invalid")
});

static MAN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z@][A-Za-z0-9]*(?:[._-][A-Za-z0-9<>]+)*$").expect("MAN_NAME regex is invalid")
});

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ANSI_ESCAPE regex is invalid")
});

/// Argument names that denote a numeric option in man pages.
const NUMERIC_ARGS: &[&str] = &[
    "number",
    "lines",
    "columns",
    "count",
    "time",
    "milliseconds",
    "seconds",
    "width",
    "height",
    "length",
    "size",
    "index",
];

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Returns true for an optionally negative decimal number (`-1`, `0.95`).
#[must_use]
pub fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || digits.matches('.').count() > 1 {
        return false;
    }
    digits.chars().any(|c| c.is_ascii_digit()) && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Infers a setting type from a raw textual value.
#[must_use]
pub fn infer_type(value: &str) -> SettingType {
    let value = value.trim();
    match value {
        "true" | "false" => SettingType::Boolean,
        v if is_numeric(v) => SettingType::Number,
        v if v.starts_with('[') || v.starts_with('{') => SettingType::Array,
        _ => SettingType::String,
    }
}

/// Infers a category from keywords in a setting name.
#[must_use]
pub fn infer_category(name: &str) -> &'static str {
    let name = name.to_lowercase();
    let has = |needle: &str| name.contains(needle);

    if has("font") {
        "font"
    } else if has("color") || has("theme") {
        "appearance"
    } else if has("window") {
        "window"
    } else if has("key") || has("bind") {
        "keybindings"
    } else if has("cursor") {
        "editor"
    } else if has("scroll") {
        "scrolling"
    } else if has("shell") {
        "terminal"
    } else {
        "general"
    }
}

/// Converts a raw textual value into a typed default.
///
/// Surrounding quotes are removed. Returns `None` for an empty value.
#[must_use]
pub fn parse_value(value: &str) -> Option<Value> {
    let value = unquote(value.trim());
    if value.is_empty() {
        return None;
    }
    Some(match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        v if is_numeric(v) => number(v).unwrap_or_else(|| Value::String(v.to_string())),
        v => Value::String(v.to_string()),
    })
}

/// Returns the setting type matching a JSON value.
#[must_use]
pub const fn type_of(value: &Value) -> SettingType {
    match value {
        Value::Bool(_) => SettingType::Boolean,
        Value::Number(_) => SettingType::Number,
        Value::Array(_) => SettingType::Array,
        Value::Object(_) => SettingType::Object,
        Value::String(_) | Value::Null => SettingType::String,
    }
}

/// Removes ANSI escapes and overstrike sequences from rendered man output.
#[must_use]
pub fn strip_formatting(text: &str) -> String {
    let plain = ANSI_ESCAPE.replace_all(text, "");
    let mut out = String::with_capacity(plain.len());
    for c in plain.chars() {
        if c == '\u{8}' {
            out.pop();
        } else {
            out.push(c);
        }
    }
    out
}

fn number(v: &str) -> Option<Value> {
    if let Ok(i) = v.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    v.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn setting(name: &str, kind: SettingType, default: Option<Value>) -> Setting {
    Setting {
        default_value: default,
        category: infer_category(name).to_string(),
        ..Setting::new(name, kind)
    }
}

/// Inserts a setting; a key seen twice becomes an array (repeatable option).
fn insert_repeatable(settings: &mut Settings, new: Setting) {
    if let Some(existing) = settings.get_mut(&new.name) {
        existing.setting_type = SettingType::Array;
        if existing.description.is_empty() {
            existing.description = new.description;
        }
        return;
    }
    settings.insert(new.name.clone(), new);
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn take_description(buffer: &mut Vec<String>) -> String {
    let text = buffer.join(" ");
    buffer.clear();
    text
}

// ---------------------------------------------------------------------------
// Command output and config file formats
// ---------------------------------------------------------------------------

/// Parses `key = value` lines with `#` doc comments preceding each key.
///
/// Used for ghostty's `+show-config --docs` output and its config file.
#[must_use]
pub fn ghostty(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut docs = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            if !comment.is_empty() {
                docs.push(comment.to_string());
            }
            continue;
        }
        if let Some(caps) = GHOSTTY_LINE.captures(line) {
            let value = caps[2].trim();
            let kind = if value.is_empty() {
                SettingType::String
            } else {
                infer_type(value)
            };
            let mut new = setting(&caps[1], kind, parse_value(value));
            new.description = take_description(&mut docs);
            insert_repeatable(&mut settings, new);
        }
    }
    settings
}

enum JsonFrame {
    Object(Option<String>),
    Skip,
}

/// Parses JSON or JSON-with-comments line by line.
///
/// Nested objects are flattened into dotted keys, `//` comments preceding a
/// member become its description, and multi-line arrays are recorded without
/// a default.
#[must_use]
pub fn jsonc(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut frames: Vec<JsonFrame> = Vec::new();
    let mut docs = Vec::new();

    for line in content.lines().map(str::trim) {
        if matches!(frames.last(), Some(JsonFrame::Skip)) {
            track_skipped_brackets(line, &mut frames);
            continue;
        }
        if line.is_empty() || line.starts_with("/*") || line.starts_with('*') {
            continue;
        }
        if let Some(comment) = line.strip_prefix("//") {
            docs.push(comment.trim().to_string());
            continue;
        }
        if line.starts_with('}') || line.starts_with(']') {
            frames.pop();
            continue;
        }
        if line == "{" {
            frames.push(JsonFrame::Object(None));
            continue;
        }
        let Some(caps) = JSON_MEMBER.captures(line) else {
            continue;
        };
        let key = &caps[1];
        let raw = json_scalar(&caps[2]);

        if raw == "{" {
            frames.push(JsonFrame::Object(Some(key.to_string())));
            docs.clear();
            continue;
        }
        if key.starts_with('_') || key.starts_with('$') {
            docs.clear();
            continue;
        }

        let name = dotted(&frames, key);
        let open = bracket_balance(raw);
        let mut new = if open > 0 {
            frames.extend((0..open).map(|_| JsonFrame::Skip));
            let kind = if raw.starts_with('{') {
                SettingType::Object
            } else {
                SettingType::Array
            };
            setting(&name, kind, None)
        } else {
            json_member(&name, raw)
        };
        new.description = take_description(&mut docs);
        settings.insert(name, new);
    }
    settings
}

fn json_member(name: &str, raw: &str) -> Setting {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => setting(name, SettingType::String, None),
        Ok(value) => setting(name, type_of(&value), Some(value)),
        Err(_) => setting(name, infer_type(raw), None),
    }
}

fn track_skipped_brackets(line: &str, frames: &mut Vec<JsonFrame>) {
    for c in line.chars() {
        match c {
            '[' | '{' => frames.push(JsonFrame::Skip),
            ']' | '}' => {
                frames.pop();
                if !matches!(frames.last(), Some(JsonFrame::Skip)) {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Unclosed `[`/`{` count in a literal, ignoring brackets inside strings.
fn bracket_balance(raw: &str) -> usize {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in raw.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn dotted(frames: &[JsonFrame], key: &str) -> String {
    let mut parts: Vec<&str> = frames
        .iter()
        .filter_map(|f| match f {
            JsonFrame::Object(Some(name)) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    parts.push(key);
    parts.join(".")
}

/// Cuts a JSON member value down to the literal, dropping the trailing comma
/// and any trailing `//` comment.
fn json_scalar(raw: &str) -> &str {
    let raw = raw.trim();
    let end = if raw.starts_with('"') {
        closing_quote(raw).map_or(raw.len(), |i| i + 1)
    } else {
        raw.find("//").unwrap_or(raw.len())
    };
    raw[..end].trim().trim_end_matches(',').trim_end()
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parses Lua `config.key = value` assignments (wezterm).
#[must_use]
pub fn lua(content: &str) -> Settings {
    let mut settings = Settings::new();
    for line in content.lines().map(str::trim) {
        let Some(caps) = LUA_ASSIGNMENT.captures(line) else {
            continue;
        };
        let value = caps[2].split(" --").next().unwrap_or_default().trim();
        let value = value.trim_end_matches(',').trim();

        let (kind, default) = match value {
            "true" | "false" => (SettingType::Boolean, parse_value(value)),
            v if v.starts_with('"') || v.starts_with('\'') => (SettingType::String, parse_value(v)),
            v if v.starts_with('{') => (SettingType::Array, None),
            v if is_numeric(v) => (SettingType::Number, parse_value(v)),
            _ => (SettingType::String, None),
        };
        settings.insert(caps[1].to_string(), setting(&caps[1], kind, default));
    }
    settings
}

/// Parses `key value` lines, skipping `#` comments (kitty.conf).
#[must_use]
pub fn whitespace_pairs(content: &str) -> Settings {
    let mut settings = Settings::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(k, v)| (k, v.trim()));
        let kind = if value.is_empty() {
            SettingType::String
        } else {
            infer_type(value)
        };
        insert_repeatable(&mut settings, setting(key, kind, parse_value(value)));
    }
    settings
}

/// Parses `tmux show-options -g` output (`option value` per line).
#[must_use]
pub fn tmux_options(output: &str) -> Settings {
    let mut settings = Settings::new();
    for line in output.lines().map(str::trim) {
        if let Some((key, value)) = line.split_once(char::is_whitespace) {
            let new = tmux_setting(key, value.trim());
            settings.insert(new.name.clone(), new);
        }
    }
    settings
}

/// Parses a tmux config file (`set -g option value` lines).
#[must_use]
pub fn tmux_conf(content: &str) -> Settings {
    let mut settings = Settings::new();
    for line in content.lines().map(str::trim) {
        if let Some(caps) = TMUX_SET.captures(line) {
            let value = caps[2].split(" #").next().unwrap_or_default().trim();
            insert_repeatable(&mut settings, tmux_setting(&caps[1], value));
        }
    }
    settings
}

fn tmux_setting(key: &str, value: &str) -> Setting {
    match value {
        "on" => setting(key, SettingType::Boolean, Some(Value::Bool(true))),
        "off" => setting(key, SettingType::Boolean, Some(Value::Bool(false))),
        _ => setting(key, infer_type(value), parse_value(value)),
    }
}

/// Parses `git config --list [--show-origin]` output.
///
/// Later entries override earlier ones, as git itself does.
#[must_use]
pub fn git_list(output: &str) -> Settings {
    let mut settings = Settings::new();
    for line in output.lines().map(str::trim) {
        let entry = line.split_once('\t').map_or(line, |(_, entry)| entry);
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry.split_once('=').unwrap_or((entry, "true"));
        let key = key.trim();
        settings.insert(key.to_string(), setting(key, infer_type(value), parse_value(value)));
    }
    settings
}

/// Parses a gitconfig-style INI file into `section[.subsection].key` names.
#[must_use]
pub fn gitconfig(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut section = String::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(caps) = INI_SECTION.captures(line) {
            section = match caps.get(2) {
                Some(sub) => format!("{}.{}", &caps[1], sub.as_str()),
                None => caps[1].to_string(),
            };
            continue;
        }
        let (key, value) = line.split_once('=').unwrap_or((line, "true"));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let name = if section.is_empty() {
            key.to_string()
        } else {
            format!("{section}.{key}")
        };
        let value = value.trim();
        settings.insert(name.clone(), setting(&name, infer_type(value), parse_value(value)));
    }
    settings
}

/// Parses YAML line by line, joining nested keys with dots.
#[must_use]
pub fn yaml_sections(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut path: Vec<(usize, String)> = Vec::new();
    let mut block_scalar: Option<usize> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        let indent = indent_of(line);
        if let Some(block) = block_scalar {
            if trimmed.is_empty() || indent > block {
                continue;
            }
            block_scalar = None;
        }
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with('-')
            || trimmed.starts_with("...")
        {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = unquote(key.trim());
        if key.is_empty() || key.contains(char::is_whitespace) {
            continue;
        }
        while path.last().is_some_and(|(depth, _)| *depth >= indent) {
            path.pop();
        }

        let value = yaml_value(value);
        if value.is_empty() {
            path.push((indent, key.to_string()));
            continue;
        }
        let name = path
            .iter()
            .map(|(_, k)| k.as_str())
            .chain(std::iter::once(key))
            .collect::<Vec<_>>()
            .join(".");
        let new = if value == "|" || value == ">" || value.starts_with("|-") || value.starts_with(">-") {
            block_scalar = Some(indent);
            setting(&name, SettingType::String, None)
        } else {
            setting(&name, infer_type(value), parse_value(value))
        };
        settings.insert(name, new);
    }
    settings
}

fn yaml_value(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.starts_with('"') || raw.starts_with('\'') {
        return raw;
    }
    raw.split(" #").next().unwrap_or_default().trim()
}

/// Parses a TOML document, flattening tables into dotted keys.
///
/// # Errors
///
/// Returns the TOML syntax error message if the document is malformed.
pub fn toml_document(content: &str) -> Result<Settings, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut settings = Settings::new();
    flatten_toml("", &table, &mut settings);
    Ok(settings)
}

fn flatten_toml(prefix: &str, table: &toml::Table, settings: &mut Settings) {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) if !inner.is_empty() => flatten_toml(&name, inner, settings),
            other => {
                let json = serde_json::to_value(other).ok();
                let kind = json.as_ref().map_or(SettingType::String, type_of);
                settings.insert(name.clone(), setting(&name, kind, json));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Documentation formats
// ---------------------------------------------------------------------------

/// Parses Markdown documentation: `config.name` references and lowercase
/// identifier headings name settings; following prose becomes the description.
#[must_use]
pub fn markdown(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut in_code = false;
    let mut current: Option<String> = None;
    let mut docs = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code && !line.contains("config.") {
            continue;
        }

        if let Some(key) = markdown_key(line) {
            flush_description(&mut settings, current.as_deref(), &mut docs);
            settings
                .entry(key.clone())
                .or_insert_with(|| setting(&key, SettingType::String, None));
            current = Some(key);
        } else if line.starts_with('#') {
            flush_description(&mut settings, current.as_deref(), &mut docs);
            current = None;
        } else if current.is_some() && !line.is_empty() && !in_code {
            docs.push(line.to_string());
        }
    }
    flush_description(&mut settings, current.as_deref(), &mut docs);
    settings
}

fn markdown_key(line: &str) -> Option<String> {
    let candidate = if let Some((_, rest)) = line.split_once("config.") {
        rest.split_whitespace().next()?
    } else if line.starts_with("##") {
        line.trim_start_matches('#').split_whitespace().next()?
    } else {
        return None;
    };
    let key: String = candidate
        .trim_start_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .collect();
    let key = key.trim_end_matches('.');
    let identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    identifier.then(|| key.to_string())
}

fn flush_description(settings: &mut Settings, current: Option<&str>, docs: &mut Vec<String>) {
    let text = take_description(docs);
    if let Some(existing) = current.and_then(|key| settings.get_mut(key)) {
        if existing.description.is_empty() {
            existing.description = text;
        }
    }
}

#[derive(Default)]
struct TableEntry {
    name: String,
    kind: Option<SettingType>,
    default_num: Option<i64>,
    default_str: Option<String>,
    text: String,
}

impl TableEntry {
    fn finish(self) -> Setting {
        let kind = self.kind.unwrap_or(SettingType::String);
        let default = match (&kind, self.default_num, self.default_str) {
            (SettingType::Boolean, Some(n), _) => Some(Value::Bool(n != 0)),
            (SettingType::Number, Some(n), _) => Some(Value::Number(n.into())),
            (_, _, Some(s)) => Some(Value::String(s)),
            _ => None,
        };
        let mut finished = setting(&self.name, kind, default);
        finished.description = self.text;
        finished
    }
}

/// Parses a C option table of `{ .name = "...", .type = ..., ... }` entries
/// (tmux's `options-table.c`).
#[must_use]
pub fn c_option_table(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut current: Option<TableEntry> = None;

    for line in content.lines() {
        if let Some(caps) = C_NAME.captures(line) {
            if let Some(done) = current.take() {
                settings.insert(done.name.clone(), done.finish());
            }
            current = Some(TableEntry {
                name: caps[1].to_string(),
                ..TableEntry::default()
            });
        }
        let Some(entry) = current.as_mut() else {
            continue;
        };
        if let Some(caps) = C_TYPE.captures(line) {
            entry.kind = Some(match &caps[1] {
                "NUMBER" => SettingType::Number,
                "FLAG" => SettingType::Boolean,
                _ => SettingType::String,
            });
        }
        if let Some(caps) = C_DEFAULT_NUM.captures(line) {
            entry.default_num = caps[1].parse().ok();
        }
        if let Some(caps) = C_DEFAULT_STR.captures(line) {
            entry.default_str = Some(caps[1].replace("\\\"", "\""));
        }
        if let Some(caps) = C_TEXT.captures(line) {
            entry.text = caps[1].replace("\\\"", "\"");
        }
    }
    if let Some(done) = current {
        settings.insert(done.name.clone(), done.finish());
    }
    settings
}

/// Parses Vim help option headers (`'name' 'alias' type (default ...)`).
#[must_use]
pub fn vimdoc(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut current: Option<String> = None;
    let mut docs = Vec::new();

    for line in content.lines() {
        if let Some(caps) = VIMDOC_HEADER.captures(line) {
            flush_description(&mut settings, current.as_deref(), &mut docs);
            let name = caps[1].to_string();
            let kind = SettingType::from(&caps[2]);
            let default = VIMDOC_DEFAULT
                .captures(&caps[3])
                .and_then(|d| vimdoc_default(&kind, d[1].trim()));
            settings.insert(name.clone(), setting(&name, kind, default));
            current = Some(name);
            continue;
        }
        if current.is_none() {
            continue;
        }
        let trimmed = line.trim();
        let scope = trimmed.starts_with("global") || trimmed.starts_with("local to");
        if trimmed.is_empty() {
            if !docs.is_empty() {
                flush_description(&mut settings, current.as_deref(), &mut docs);
                current = None;
            }
        } else if indent_of(line) == 0 || trimmed.starts_with("*'") {
            flush_description(&mut settings, current.as_deref(), &mut docs);
            current = None;
        } else if !(scope && docs.is_empty()) {
            docs.push(trimmed.to_string());
        }
    }
    flush_description(&mut settings, current.as_deref(), &mut docs);
    settings
}

fn vimdoc_default(kind: &SettingType, raw: &str) -> Option<Value> {
    match (kind, raw) {
        (SettingType::Boolean, "on") => Some(Value::Bool(true)),
        (SettingType::Boolean, "off") => Some(Value::Bool(false)),
        (SettingType::Number, v) => v.split_whitespace().next().and_then(number),
        (SettingType::String, v) => Some(Value::String(unquote(v).to_string())),
        _ => None,
    }
}

/// Parses the OPTIONS section of an mdoc manual source (`tmux.1`).
#[must_use]
pub fn mdoc(content: &str) -> Settings {
    let mut settings = Settings::new();
    let mut in_options = false;
    let mut current: Option<String> = None;

    for line in content.lines().map(str::trim) {
        if let Some(section) = line.strip_prefix(".Sh ") {
            in_options = section.trim() == "OPTIONS";
            current = None;
            continue;
        }
        if !in_options {
            continue;
        }
        if let Some(caps) = MDOC_ITEM.captures(line) {
            let name = caps[1].to_string();
            let kind = match caps.get(2) {
                Some(arg) if NUMERIC_ARGS.contains(&arg.as_str()) => SettingType::Number,
                _ => SettingType::String,
            };
            settings
                .entry(name.clone())
                .or_insert_with(|| setting(&name, kind, None));
            current = Some(name);
            continue;
        }
        let Some(entry) = current.as_deref().and_then(|key| settings.get_mut(key)) else {
            continue;
        };
        if let Some(caps) = MDOC_CHOICE.captures(line) {
            apply_choices(entry, &caps[1].replace("Ic ", ""));
        } else if !line.starts_with('.') && !line.is_empty() && entry.description.is_empty() {
            entry.description = line.to_string();
        }
    }
    settings
}

fn apply_choices(entry: &mut Setting, raw: &str) {
    let values: Vec<String> = raw
        .split('|')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    let mut sorted = values.clone();
    sorted.sort();
    if sorted == ["off", "on"] {
        entry.setting_type = SettingType::Boolean;
    } else if values.len() > 1 {
        entry.setting_type = SettingType::String;
        entry.valid_values = values;
    }
}

/// Parses a rendered man page (`man -P cat`).
///
/// An option entry is a lightly indented line starting with an option name,
/// followed by a more deeply indented description paragraph. A bracketed
/// argument list (`[on | off]`) supplies the type or permitted values.
#[must_use]
pub fn man_page(content: &str) -> Settings {
    let text = strip_formatting(content);
    let lines: Vec<&str> = text.lines().collect();
    let mut settings = Settings::new();

    for (i, line) in lines.iter().enumerate() {
        let indent = indent_of(line);
        if !(3..=8).contains(&indent) {
            continue;
        }
        let trimmed = line.trim();
        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(n, r)| (n, r.trim()));
        if !MAN_NAME.is_match(name) || !is_argument_spec(rest) {
            continue;
        }
        let Some(body_start) = lines[i + 1..].iter().position(|l| !l.trim().is_empty()) else {
            continue;
        };
        let body_indent = indent_of(lines[i + 1 + body_start]);
        if body_indent <= indent {
            continue;
        }
        let description = lines[i + 1 + body_start..]
            .iter()
            .take_while(|l| !l.trim().is_empty() && indent_of(l) >= body_indent)
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" ");

        let mut entry = setting(name, man_argument_type(rest), None);
        entry.description = description;
        if let Some(choices) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            apply_choices(&mut entry, choices);
        }
        settings.entry(name.to_string()).or_insert(entry);
    }
    settings
}

fn is_argument_spec(rest: &str) -> bool {
    rest.is_empty()
        || (rest.starts_with('[') && rest.ends_with(']'))
        || (rest.starts_with('(') && rest.ends_with(')'))
        || (rest.split_whitespace().count() <= 2 && !rest.ends_with('.'))
}

fn man_argument_type(rest: &str) -> SettingType {
    if NUMERIC_ARGS.contains(&rest) {
        SettingType::Number
    } else {
        SettingType::String
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
