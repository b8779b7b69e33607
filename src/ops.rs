//! Config operations: default document generation, key lookup, and listing.

use toml::{Table, Value};

use crate::document;
use crate::error::SemrelError;
use crate::raw::RawConfig;
use crate::types::DocumentFormat;

/// Render the default configuration as a document.
///
/// With `nested`, TOML output sits under `[tool.semantic_release]` (ready to
/// paste into `pyproject.toml`) and JSON under a `semantic_release` key.
/// Either way the output loads back to [`RawConfig::default()`].
pub fn generate_config(format: DocumentFormat, nested: bool) -> Result<String, SemrelError> {
    let mut table = RawConfig::default().to_table()?;
    if nested {
        table = document::nest(table, format == DocumentFormat::Toml);
    }
    match format {
        DocumentFormat::Toml => {
            toml::to_string_pretty(&table).map_err(|e| SemrelError::Render(e.to_string()))
        }
        DocumentFormat::Json => {
            serde_json::to_string_pretty(&table).map_err(|e| SemrelError::Render(e.to_string()))
        }
    }
}

/// Get a config value by dotted key, formatted for display.
///
/// `remote.token` is always present, derived from `remote.type` if unset.
pub fn get_value(config: &RawConfig, key: &str) -> Result<String, SemrelError> {
    let table = display_table(config)?;
    table_get(&table, key)
        .map(format_value)
        .ok_or_else(|| SemrelError::KeyNotFound(key.into()))
}

/// Every leaf value as a sorted `(dotted key, display value)` pair.
pub fn list_values(config: &RawConfig) -> Result<Vec<(String, String)>, SemrelError> {
    let mut entries = Vec::new();
    collect_leaves(&display_table(config)?, "", &mut entries);
    entries.sort();
    Ok(entries)
}

fn display_table(config: &RawConfig) -> Result<Table, SemrelError> {
    let mut table = config.to_table()?;
    if let Some(Value::Table(remote)) = table.get_mut("remote")
        && !remote.contains_key("token")
    {
        let token = Value::try_from(config.remote.token())
            .map_err(|e| SemrelError::Render(e.to_string()))?;
        remote.insert("token".to_string(), token);
    }
    Ok(table)
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"remote.type"`).
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let mut current = table;
    if let Some(path) = path {
        for segment in path.split('.') {
            current = current.get(segment)?.as_table()?;
        }
    }
    current.get(leaf)
}

fn collect_leaves(table: &Table, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            // env references are shown as `${VAR}` rather than expanded
            Value::Table(t) if !is_env_reference(t) && !t.is_empty() => {
                collect_leaves(t, &path, out)
            }
            other => out.push((path, format_value(other))),
        }
    }
}

fn is_env_reference(table: &Table) -> bool {
    table.contains_key("env") && table.keys().all(|k| k == "env" || k == "default")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Table(t) if is_env_reference(t) => match (t.get("env"), t.get("default")) {
            (Some(Value::String(env)), Some(Value::String(default))) => {
                format!("${{{env}:-{default}}}")
            }
            (Some(Value::String(env)), None) => format!("${{{env}}}"),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}
