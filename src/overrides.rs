//! Turn `KEY=VALUE` command-line overrides into a nested `toml::Table`.
//!
//! `("remote.type", "gitlab")` becomes `{remote = {type = "gitlab"}}`, ready to
//! deep-merge over the configuration document.

use toml::{Table, Value};

use crate::env::parse_scalar;
use crate::error::{FieldError, ValidationFailure};

/// Split a `KEY=VALUE` argument. Used as a clap value parser.
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(format!("'{key}' is not a valid dotted key"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Convert dotted-key overrides into a nested table. Values go through
/// [`parse_scalar`]; the last entry for a key wins.
///
/// An override that needs a table where an earlier override put a scalar
/// (`remote=x` then `remote.type=y`) is reported against its key.
pub fn overrides_to_table(entries: &[(String, String)]) -> Result<Table, ValidationFailure> {
    let mut table = Table::new();
    let mut errors = Vec::new();
    for (dotted_key, raw) in entries {
        if let Err(e) = set_nested(&mut table, dotted_key, parse_scalar(raw)) {
            errors.push(e);
        }
    }
    if errors.is_empty() {
        Ok(table)
    } else {
        Err(ValidationFailure::new(errors))
    }
}

fn set_nested(table: &mut Table, dotted_key: &str, value: Value) -> Result<(), FieldError> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(FieldError::new(dotted_key, "empty override key"));
    };

    let mut current = table;
    for segment in parents {
        current = current
            .entry(*segment)
            .or_insert_with(|| Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| {
                FieldError::new(
                    dotted_key,
                    format!("'{segment}' was already overridden with a non-table value"),
                )
            })?;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}
