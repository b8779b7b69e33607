//! Field-by-field reading of a document table.
//!
//! A [`FieldReader`] owns the table it reads. Every key it is asked for is
//! removed, so whatever is left at [`finish`](FieldReader::finish) is unknown.
//! Type errors are recorded against the dotted path and reading continues, so
//! one pass reports every problem in the document.
//!
//! Problems are either structural (wrong type, unknown key, unparsable value)
//! or constraints between settings that another layer may still satisfy. Only
//! structural problems are meaningful for a single sparse layer.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::error::FieldError;

pub(crate) struct FieldReader {
    table: Table,
    prefix: String,
    errors: Vec<FieldError>,
    constraints: Vec<FieldError>,
}

impl FieldReader {
    pub fn new(table: Table) -> Self {
        Self::at(table, String::new())
    }

    fn at(table: Table, prefix: String) -> Self {
        Self {
            table,
            prefix,
            errors: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// Record a problem with `key` (which may carry an index suffix like `patterns[2]`).
    pub fn error(&mut self, key: &str, reason: impl Into<String>) {
        let path = self.path(key);
        self.errors.push(FieldError::new(path, reason));
    }

    /// Record a rule that only holds for the fully merged configuration.
    pub fn constraint(&mut self, key: &str, reason: impl Into<String>) {
        let path = self.path(key);
        self.constraints.push(FieldError::new(path, reason));
    }

    /// Take `key` and deserialize it. Missing keys and invalid values both give
    /// `None`; only the latter records an error.
    ///
    /// A bare number or boolean is accepted where text is expected, since the
    /// env and `--set` layers cannot tell `1` from `"1"`.
    pub fn optional<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.table.remove(key)?;
        let as_text = scalar_text(&value);
        match value.try_into::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                let coerced = as_text.and_then(|text| Value::String(text).try_into::<T>().ok());
                if coerced.is_some() {
                    return coerced;
                }
                self.error(key, e.message().to_string());
                None
            }
        }
    }

    pub fn or<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        self.optional(key).unwrap_or(default)
    }

    /// Take `key` as a nested section. A missing section reads as empty.
    pub fn section(&mut self, key: &str) -> FieldReader {
        let path = self.path(key);
        let table = match self.table.remove(key) {
            None => Table::new(),
            Some(Value::Table(table)) => table,
            Some(other) => {
                self.error(key, format!("expected a table, found {}", other.type_str()));
                Table::new()
            }
        };
        FieldReader::at(table, path)
    }

    /// Take `key` as a table of named sections (e.g. `[branches.main]`).
    /// Returns `None` when the key is absent or is not a table. Callers must
    /// [`absorb`](Self::absorb) each returned reader.
    pub fn sections(&mut self, key: &str) -> Option<Vec<(String, FieldReader)>> {
        let outer_path = self.path(key);
        let table = match self.table.remove(key)? {
            Value::Table(table) => table,
            other => {
                self.error(key, format!("expected a table, found {}", other.type_str()));
                return None;
            }
        };

        let mut entries = Vec::with_capacity(table.len());
        for (name, value) in table {
            match value {
                Value::Table(inner) => {
                    let reader = FieldReader::at(inner, format!("{outer_path}.{name}"));
                    entries.push((name, reader));
                }
                other => self.error(
                    &format!("{key}.{name}"),
                    format!("expected a table, found {}", other.type_str()),
                ),
            }
        }
        Some(entries)
    }

    /// Fold a finished child reader's errors (including its unknown keys) into this one.
    pub fn absorb(&mut self, child: FieldReader) {
        let (errors, constraints) = child.finish_split();
        self.errors.extend(errors);
        self.constraints.extend(constraints);
    }

    /// Consume the reader: structural errors first, then constraint violations.
    pub fn finish(self) -> Vec<FieldError> {
        let (mut errors, constraints) = self.finish_split();
        errors.extend(constraints);
        errors
    }

    /// Consume the reader, reporting leftover keys as unknown. Returns
    /// structural errors and constraint violations separately.
    pub fn finish_split(mut self) -> (Vec<FieldError>, Vec<FieldError>) {
        let leftover: Vec<String> = self.table.keys().cloned().collect();
        for key in leftover {
            self.error(&key, "unknown key");
        }
        (self.errors, self.constraints)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(content: &str) -> FieldReader {
        FieldReader::new(toml::from_str(content).unwrap())
    }

    #[test]
    fn reads_typed_values_and_defaults() {
        let mut r = reader("major_on_zero = false\n");
        assert!(!r.or("major_on_zero", true));
        assert!(r.or("allow_zero_version", true));
        assert!(r.finish().is_empty());
    }

    #[test]
    fn type_error_is_recorded_with_path() {
        let mut r = reader("[remote]\ninsecure = \"yes\"\n");
        let mut remote = r.section("remote");
        assert!(!remote.or("insecure", false));
        r.absorb(remote);
        let errors = r.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "remote.insecure");
    }

    #[test]
    fn leftover_keys_are_unknown() {
        let mut r = reader("tag_format = \"v{version}\"\ntypo = 1\n[remote]\nkind = \"x\"\n");
        let _: Option<String> = r.optional("tag_format");
        let remote = r.section("remote");
        r.absorb(remote);
        let paths: Vec<String> = r.finish().into_iter().map(|e| e.path).collect();
        assert!(paths.contains(&"typo".to_string()));
        assert!(paths.contains(&"remote.kind".to_string()));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn scalar_where_section_expected() {
        let mut r = reader("remote = \"github\"\n");
        let remote = r.section("remote");
        r.absorb(remote);
        let errors = r.finish();
        assert_eq!(errors[0].path, "remote");
        assert!(errors[0].reason.contains("expected a table"));
    }

    #[test]
    fn named_sections_carry_their_path() {
        let mut r = reader("[branches.main]\nmatch = \"main\"\n[branches.beta]\nextra = 1\n");
        let entries = r.sections("branches").unwrap();
        assert_eq!(entries.len(), 2);
        for (_, mut entry) in entries {
            let _: Option<String> = entry.optional("match");
            r.absorb(entry);
        }
        let errors = r.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "branches.beta.extra");
    }

    #[test]
    fn number_accepted_as_text() {
        let mut r = reader("prerelease_token = 1\nratio = 2.5\nflag = true\n");
        assert_eq!(r.optional::<String>("prerelease_token").as_deref(), Some("1"));
        assert_eq!(r.optional::<String>("ratio").as_deref(), Some("2.5"));
        assert_eq!(r.optional::<String>("flag").as_deref(), Some("true"));
        assert!(r.finish().is_empty());
    }

    #[test]
    fn text_not_coerced_into_other_types() {
        let mut r = reader("insecure = 1\n");
        assert!(!r.or("insecure", false));
        let errors = r.finish();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].reason.contains("integer"));
    }

    #[test]
    fn constraints_kept_apart_from_structural_errors() {
        let mut r = reader("[remote]\ntypo = 1\n");
        let mut remote = r.section("remote");
        remote.constraint("domain", "needs insecure");
        r.absorb(remote);
        let (errors, constraints) = r.finish_split();
        assert_eq!(errors[0].path, "remote.typo");
        assert_eq!(constraints[0].path, "remote.domain");
    }

    #[test]
    fn absent_sections_give_none() {
        let mut r = reader("");
        assert!(r.sections("branches").is_none());
        assert!(r.finish().is_empty());
    }
}
