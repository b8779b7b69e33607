use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::repo::RepositoryError;

/// A single problem found while validating a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `remote.type`.
    pub path: String,
    pub reason: String,
    /// 1-indexed line in the source document, when it could be located.
    pub line: Option<usize>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
            line: None,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

/// Every field error found in one document (or one merged result), reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.errors, .origin))]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
    origin: Option<PathBuf>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self {
            errors,
            origin: None,
        }
    }

    pub fn single(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(path, reason)])
    }

    /// Attach the document the errors were found in.
    pub fn with_origin(mut self, origin: &Path) -> Self {
        self.origin = Some(origin.to_path_buf());
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub(crate) fn errors_mut(&mut self) -> &mut [FieldError] {
        &mut self.errors
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Whether any error points at `path` or at a field below it.
    pub fn touches(&self, path: &str) -> bool {
        self.errors.iter().any(|e| {
            e.path == path
                || e.path
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }
}

fn render(errors: &[FieldError], origin: &Option<PathBuf>) -> String {
    let noun = if errors.len() == 1 { "error" } else { "errors" };
    let mut out = format!("{} validation {noun} in configuration", errors.len());
    if let Some(origin) = origin {
        out.push(' ');
        out.push_str(&origin.display().to_string());
    }
    for error in errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}

/// A required environment variable was not set and declared no default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Environment variable '{var}' is not set and has no default")]
pub struct ResolutionFailure {
    pub var: String,
}

impl ResolutionFailure {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[derive(Debug, Error)]
pub enum SemrelError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Document {path} is not a table of settings: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to render configuration: {0}")]
    Render(String),

    #[error("Unknown configuration key: {0}")]
    KeyNotFound(String),

    #[error("Branch '{branch}' does not match any release group (checked: {groups})")]
    NotAReleaseBranch { branch: String, groups: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
