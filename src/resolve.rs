//! Layer pipeline: merge every document and the env layer into one [`RawConfig`].
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O. Steps:
//!
//! 1. Parse each document and pick its configuration root
//! 2. Check each document on its own, so type errors and unknown keys name
//!    the file and line
//! 3. Deep-merge documents (later overrides earlier)
//! 4. Deep-merge the prefixed env layer on top
//! 5. Validate the merged table into a `RawConfig`, including the rules that
//!    relate several settings

use std::path::{Path, PathBuf};

use toml::Table;

use crate::document;
use crate::env;
use crate::error::{SemrelError, ValidationFailure};
use crate::merge::deep_merge;
use crate::raw::RawConfig;
use crate::types::DocumentFormat;
use crate::validate;

/// All pre-loaded data needed to resolve a config.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Document contents in precedence order: first = lowest priority.
    pub documents: Vec<(PathBuf, String)>,
    /// Raw environment pairs (`std::env::vars()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix. `None` disables the env layer.
    pub env_prefix: Option<String>,
}

pub fn resolve(input: ResolveInput) -> Result<RawConfig, SemrelError> {
    let mut merged = Table::new();
    let mut sole_source = None;
    for (path, content) in &input.documents {
        let format = DocumentFormat::from_path(path);
        let (section, root) = document::release_section(document::parse(content, format, path)?);

        RawConfig::check_layer(&section)
            .map_err(|failure| locate(failure, path, content, format, root))?;

        tracing::debug!(path = %path.display(), keys = section.len(), "merging config document");
        merged = deep_merge(merged, section);
        if input.documents.len() == 1 {
            sole_source = Some((path, content, format, root));
        }
    }

    if let Some(prefix) = &input.env_prefix {
        let env_table = env::env_to_table(prefix, input.env_vars);
        if !env_table.is_empty() {
            tracing::debug!(prefix = %prefix, keys = env_table.len(), "merging env layer");
            merged = deep_merge(merged, env_table);
            sole_source = None;
        }
    }

    RawConfig::validate(&merged).map_err(|failure| match sole_source {
        Some((path, content, format, root)) => locate(failure, path, content, format, root).into(),
        None => failure.into(),
    })
}

fn locate(
    failure: ValidationFailure,
    path: &Path,
    content: &str,
    format: DocumentFormat,
    root: &[&str],
) -> ValidationFailure {
    let failure = match format {
        DocumentFormat::Toml => validate::locate_lines(failure, content, root),
        DocumentFormat::Json => failure,
    };
    failure.with_origin(path)
}
