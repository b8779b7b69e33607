//! Environment access: deferred variable references and the prefixed env layer.
//!
//! Nothing in this module reads `std::env` except [`ProcessEnv`]. Everything else
//! takes an [`EnvLookup`] or an iterator of pairs so tests can pass synthetic data.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::error::ResolutionFailure;

/// Source of environment variable values.
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// The live process environment. Every lookup reads `std::env` again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvLookup for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A value read from an environment variable, with an optional literal fallback.
///
/// Written in documents as `{ env = "GH_TOKEN" }` or
/// `{ env = "RELEASE_URL", default = "https://example.com" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfigVar {
    pub env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl EnvConfigVar {
    pub fn new(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            default: None,
        }
    }

    pub fn with_default(env: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            default: Some(default.into()),
        }
    }

    /// The variable's value, else the default, else `None`.
    pub fn lookup<E: EnvLookup + ?Sized>(&self, env: &E) -> Option<String> {
        env.var(&self.env).or_else(|| self.default.clone())
    }

    pub fn resolve<E: EnvLookup + ?Sized>(&self, env: &E) -> Result<String, ResolutionFailure> {
        self.lookup(env)
            .ok_or_else(|| ResolutionFailure::new(&self.env))
    }
}

impl fmt::Display for EnvConfigVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "${{{}:-{default}}}", self.env),
            None => write!(f, "${{{}}}", self.env),
        }
    }
}

/// A setting that is either written inline or read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, expecting = "a string or a table with an `env` key")]
pub enum EnvOrLiteral {
    Literal(String),
    Env(EnvConfigVar),
}

impl EnvOrLiteral {
    pub fn as_env(&self) -> Option<&EnvConfigVar> {
        match self {
            EnvOrLiteral::Env(var) => Some(var),
            EnvOrLiteral::Literal(_) => None,
        }
    }

    pub fn lookup<E: EnvLookup + ?Sized>(&self, env: &E) -> Option<String> {
        match self {
            EnvOrLiteral::Literal(value) => Some(value.clone()),
            EnvOrLiteral::Env(var) => var.lookup(env),
        }
    }

    pub fn resolve<E: EnvLookup + ?Sized>(&self, env: &E) -> Result<String, ResolutionFailure> {
        match self {
            EnvOrLiteral::Literal(value) => Ok(value.clone()),
            EnvOrLiteral::Env(var) => var.resolve(env),
        }
    }
}

impl From<EnvConfigVar> for EnvOrLiteral {
    fn from(var: EnvConfigVar) -> Self {
        EnvOrLiteral::Env(var)
    }
}

impl From<&str> for EnvOrLiteral {
    fn from(value: &str) -> Self {
        EnvOrLiteral::Literal(value.to_string())
    }
}

impl PartialEq<EnvConfigVar> for EnvOrLiteral {
    fn eq(&self, other: &EnvConfigVar) -> bool {
        self.as_env() == Some(other)
    }
}

/// Build a `toml::Table` from environment variables matching `{PREFIX}__*`.
///
/// `__` separates nesting levels and segments are lowercased, so
/// `SEMANTIC_RELEASE__REMOTE__TYPE=gitlab` becomes `remote.type = "gitlab"`.
/// Values go through [`parse_scalar`].
pub fn env_to_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut table = Table::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        insert_nested(&mut table, &segments, parse_scalar(&value));
    }

    table
}

fn insert_nested(table: &mut Table, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(head.clone(), value);
        return;
    }

    let sub = table
        .entry(head.as_str())
        .or_insert_with(|| Value::Table(Table::new()));
    // A scalar already set at this level wins over a deeper path.
    if let Value::Table(sub_table) = sub {
        insert_nested(sub_table, rest, value);
    }
}

/// Interpret a raw string as a TOML scalar: bool, then integer, then float
/// (only when it contains a dot), then string.
pub fn parse_scalar(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{env, vars};

    #[test]
    fn resolve_reads_variable() {
        let var = EnvConfigVar::new("GH_TOKEN");
        assert_eq!(var.resolve(&env(&[("GH_TOKEN", "abc")])).unwrap(), "abc");
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let var = EnvConfigVar::with_default("RELEASE_URL", "https://example.com");
        assert_eq!(var.resolve(&env(&[])).unwrap(), "https://example.com");
    }

    #[test]
    fn variable_wins_over_default() {
        let var = EnvConfigVar::with_default("RELEASE_URL", "https://example.com");
        let resolved = var.resolve(&env(&[("RELEASE_URL", "https://other")])).unwrap();
        assert_eq!(resolved, "https://other");
    }

    #[test]
    fn missing_without_default_names_variable() {
        let err = EnvConfigVar::new("GITEA_TOKEN").resolve(&env(&[])).unwrap_err();
        assert_eq!(err.var, "GITEA_TOKEN");
    }

    #[test]
    fn empty_value_is_still_a_value() {
        let var = EnvConfigVar::with_default("GH_TOKEN", "fallback");
        assert_eq!(var.resolve(&env(&[("GH_TOKEN", "")])).unwrap(), "");
    }

    #[test]
    fn each_resolution_sees_current_environment() {
        let var = EnvConfigVar::new("GH_TOKEN");
        let mut snapshot = env(&[("GH_TOKEN", "first")]);
        assert_eq!(var.resolve(&snapshot).unwrap(), "first");
        snapshot.insert("GH_TOKEN".into(), "second".into());
        assert_eq!(var.resolve(&snapshot).unwrap(), "second");
        snapshot.remove("GH_TOKEN");
        assert!(var.resolve(&snapshot).is_err());
    }

    #[test]
    fn equality_ignores_environment() {
        let a = EnvConfigVar::with_default("GH_TOKEN", "x");
        let b = EnvConfigVar::with_default("GH_TOKEN", "x");
        assert_eq!(a, b);
        assert_ne!(a, EnvConfigVar::new("GH_TOKEN"));
        assert_ne!(a, EnvConfigVar::with_default("GITLAB_TOKEN", "x"));
    }

    #[test]
    fn display_shows_reference_not_value() {
        assert_eq!(EnvConfigVar::new("GH_TOKEN").to_string(), "${GH_TOKEN}");
        assert_eq!(
            EnvConfigVar::with_default("A", "b").to_string(),
            "${A:-b}"
        );
    }

    #[test]
    fn deserialize_table_form() {
        let value: EnvOrLiteral = toml::from_str::<toml::Table>(r#"v = { env = "X", default = "y" }"#)
            .unwrap()
            .remove("v")
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(value, EnvConfigVar::with_default("X", "y"));
    }

    #[test]
    fn deserialize_literal_form() {
        let value: EnvOrLiteral = Value::String("plain".into()).try_into().unwrap();
        assert_eq!(value, EnvOrLiteral::Literal("plain".into()));
        assert_eq!(value.resolve(&env(&[])).unwrap(), "plain");
    }

    #[test]
    fn unknown_field_in_table_form_rejected() {
        let table: Table = toml::from_str(r#"env = "X"
fallback = "y""#)
            .unwrap();
        let result: Result<EnvOrLiteral, _> = Value::Table(table).try_into();
        assert!(result.is_err());
    }

    #[test]
    fn serialize_omits_missing_default() {
        let value = Value::try_from(EnvConfigVar::new("GH_TOKEN")).unwrap();
        let table = value.as_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["env"].as_str(), Some("GH_TOKEN"));
    }

    #[test]
    fn prefixed_vars_become_nested_table() {
        let table = env_to_table(
            "SEMANTIC_RELEASE",
            vars(&[
                ("SEMANTIC_RELEASE__REMOTE__TYPE", "gitlab"),
                ("SEMANTIC_RELEASE__MAJOR_ON_ZERO", "false"),
                ("SEMANTIC_RELEASE__CHANGELOG__CHANGELOG_FILE", "HISTORY.md"),
            ]),
        );
        assert_eq!(table["remote"]["type"].as_str(), Some("gitlab"));
        assert_eq!(table["major_on_zero"].as_bool(), Some(false));
        assert_eq!(
            table["changelog"]["changelog_file"].as_str(),
            Some("HISTORY.md")
        );
    }

    #[test]
    fn unrelated_and_bare_prefix_vars_ignored() {
        let table = env_to_table(
            "SEMANTIC_RELEASE",
            vars(&[
                ("GH_TOKEN", "secret"),
                ("SEMANTIC_RELEASE", "x"),
                ("SEMANTIC_RELEASE__", "x"),
                ("SEMANTIC_RELEASE_TAG_FORMAT", "x"),
            ]),
        );
        assert!(table.is_empty());
    }

    #[test]
    fn scalar_heuristics() {
        assert_eq!(parse_scalar("TRUE"), Value::Boolean(true));
        assert_eq!(parse_scalar("-3"), Value::Integer(-3));
        assert_eq!(parse_scalar("1.5"), Value::Float(1.5));
        assert_eq!(parse_scalar("inf"), Value::String("inf".into()));
        assert_eq!(parse_scalar("v{version}"), Value::String("v{version}".into()));
    }
}
