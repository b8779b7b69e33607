//! Parsing configuration documents into tables.
//!
//! TOML and JSON are accepted. Settings may live at the top level of the
//! document or under a dedicated table, which is how they are embedded in
//! project files:
//!
//! - `[tool.semantic_release]` in `pyproject.toml`
//! - `[semantic_release]` (TOML) or `{"semantic_release": {...}}` (JSON)
//!
//! The first of these found is used as the configuration root; otherwise the
//! whole document is.

use std::path::Path;

use toml::{Table, Value};

use crate::error::SemrelError;
use crate::types::DocumentFormat;

/// Name of the table that holds settings inside a larger document.
pub const SECTION_NAME: &str = "semantic_release";

/// Config file read when no other file is named.
pub const DEFAULT_CONFIG_FILE: &str = "pyproject.toml";

const TOOL_ROOT: &[&str] = &["tool", SECTION_NAME];
const SECTION_ROOT: &[&str] = &[SECTION_NAME];

/// Parse document text into a table. `path` is only used in error messages.
pub fn parse(content: &str, format: DocumentFormat, path: &Path) -> Result<Table, SemrelError> {
    match format {
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| SemrelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }),
        DocumentFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(content).map_err(|e| SemrelError::JsonError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            match Value::try_from(drop_nulls(json)) {
                Ok(Value::Table(table)) => Ok(table),
                Ok(other) => Err(SemrelError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: format!("top level is {}", other.type_str()),
                }),
                Err(e) => Err(SemrelError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }),
            }
        }
    }
}

/// Remove `null` object members, which mean "not set". TOML has no null.
fn drop_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(drop_nulls).collect())
        }
        other => other,
    }
}

/// Pick the configuration root out of a parsed document.
///
/// Returns the settings table and the key path it was found under.
pub fn release_section(mut document: Table) -> (Table, &'static [&'static str]) {
    if let Some(Value::Table(tool)) = document.get_mut(TOOL_ROOT[0])
        && let Some(Value::Table(section)) = tool.remove(SECTION_NAME)
    {
        return (section, TOOL_ROOT);
    }
    if let Some(Value::Table(section)) = document.remove(SECTION_NAME) {
        return (section, SECTION_ROOT);
    }
    // pyproject.toml without our table: nothing configured.
    if document.contains_key("tool") || document.contains_key("project") {
        return (Table::new(), &[]);
    }
    (document, &[])
}

/// Wrap a settings table the way it would appear in a project file.
pub fn nest(settings: Table, under_tool: bool) -> Table {
    let mut section = Table::new();
    section.insert(SECTION_NAME.to_string(), Value::Table(settings));
    if !under_tool {
        return section;
    }
    let mut root = Table::new();
    root.insert(TOOL_ROOT[0].to_string(), Value::Table(section));
    root
}

/// Whether `path` names the default config file (which may be absent).
pub fn is_default_config_file(path: &Path) -> bool {
    path == Path::new(DEFAULT_CONFIG_FILE)
}
