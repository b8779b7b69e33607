use std::path::{Path, PathBuf};

use crate::cli::GlobalCommandLineOptions;
use crate::document::{self, DEFAULT_CONFIG_FILE};
use crate::error::SemrelError;
use crate::raw::RawConfig;
use crate::resolve::{self, ResolveInput};

/// Prefix of the environment layer enabled by [`ConfigLoader::from_options`].
pub const DEFAULT_ENV_PREFIX: &str = "SEMANTIC_RELEASE";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File { path: PathBuf, required: bool },
    Inline { name: PathBuf, content: String },
}

/// Builder that reads configuration documents and resolves them into a [`RawConfig`].
///
/// Documents are listed in **priority-ascending** order: the last one added
/// wins. The environment layer sits above every document and is off until
/// [`env_prefix()`](Self::env_prefix) is called.
///
/// ```ignore
/// let raw = ConfigLoader::new()
///     .optional_file("pyproject.toml")
///     .file("releaserc.json")
///     .env_prefix("SEMANTIC_RELEASE")
///     .load()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    sources: Vec<Source>,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader for a command-line invocation: the `--config` file if given
    /// (which must exist), otherwise `pyproject.toml` if present, plus the
    /// `SEMANTIC_RELEASE__*` environment layer.
    pub fn from_options(options: &GlobalCommandLineOptions) -> Self {
        let loader = match &options.config_file {
            Some(path) if !document::is_default_config_file(path) => Self::new().file(path),
            Some(path) => Self::new().optional_file(path),
            None => Self::new().optional_file(DEFAULT_CONFIG_FILE),
        };
        loader.env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Add a document that must exist.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: true,
        });
        self
    }

    /// Add a document that is skipped when missing.
    pub fn optional_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: false,
        });
        self
    }

    /// Add document text directly. `name` is used in error messages and its
    /// extension selects the format.
    pub fn document(mut self, name: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.sources.push(Source::Inline {
            name: name.as_ref().to_path_buf(),
            content: content.into(),
        });
        self
    }

    /// Enable the `{prefix}__SECTION__KEY` environment layer.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Use these pairs for the environment layer instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Read every document into a [`ResolveInput`]; this is the only I/O step.
    pub fn build_input(&self) -> Result<ResolveInput, SemrelError> {
        let mut documents = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source {
                Source::File { path, required } => {
                    if let Some(content) = read_document(path, *required)? {
                        documents.push((path.clone(), content));
                    }
                }
                Source::Inline { name, content } => documents.push((name.clone(), content.clone())),
            }
        }

        let env_vars = match (&self.env_prefix, &self.env_vars) {
            (None, _) => Vec::new(),
            (Some(_), Some(vars)) => vars.clone(),
            (Some(_), None) => std::env::vars().collect(),
        };

        Ok(ResolveInput {
            documents,
            env_vars,
            env_prefix: self.env_prefix.clone(),
        })
    }

    /// Load and resolve the configuration through all layers.
    pub fn load(self) -> Result<RawConfig, SemrelError> {
        resolve::resolve(self.build_input()?)
    }
}

fn read_document(path: &Path, required: bool) -> Result<Option<String>, SemrelError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "read config document");
            Ok(Some(content))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::debug!(path = %path.display(), "optional config document not found");
            Ok(None)
        }
        Err(e) => Err(SemrelError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::PYPROJECT;
    use crate::types::HvcsClient;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_nothing_gives_defaults() {
        let raw = ConfigLoader::new().load().unwrap();
        assert_eq!(raw, RawConfig::default());
    }

    #[test]
    fn load_pyproject_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, PYPROJECT).unwrap();

        let raw = ConfigLoader::new().file(&path).load().unwrap();
        assert_eq!(raw.remote.kind, HvcsClient::Github);
        assert!(raw.version_toml.is_some());
    }

    #[test]
    fn missing_optional_file_skipped() {
        let dir = TempDir::new().unwrap();
        let input = ConfigLoader::new()
            .optional_file(dir.path().join("pyproject.toml"))
            .build_input()
            .unwrap();
        assert!(input.documents.is_empty());
    }

    #[test]
    fn missing_required_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::new()
            .file(dir.path().join("releaserc.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, SemrelError::IoError { .. }));
        assert!(err.to_string().contains("releaserc.toml"));
    }

    #[test]
    fn later_sources_win() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("base.toml");
        fs::write(&path, "[remote]\ntype = \"gitlab\"\n").unwrap();

        let raw = ConfigLoader::new()
            .file(&path)
            .document("local.json", r#"{"remote": {"type": "gitea"}}"#)
            .load()
            .unwrap();
        assert_eq!(raw.remote.kind, HvcsClient::Gitea);
    }

    #[test]
    fn env_layer_uses_given_vars() {
        let raw = ConfigLoader::new()
            .document("a.toml", "major_on_zero = true\n")
            .env_prefix("SEMREL")
            .env_vars([("SEMREL__MAJOR_ON_ZERO", "false")])
            .load()
            .unwrap();
        assert!(!raw.major_on_zero);
    }

    #[test]
    fn env_vars_ignored_without_prefix() {
        let input = ConfigLoader::new()
            .env_vars([("SEMREL__MAJOR_ON_ZERO", "false")])
            .build_input()
            .unwrap();
        assert!(input.env_vars.is_empty());
        assert!(input.env_prefix.is_none());
    }

    #[test]
    fn options_with_config_file_require_it() {
        let options = GlobalCommandLineOptions {
            config_file: Some("/nonexistent/releaserc.toml".into()),
            ..GlobalCommandLineOptions::default()
        };
        let loader = ConfigLoader::from_options(&options).env_vars(Vec::<(String, String)>::new());
        assert!(matches!(loader.load(), Err(SemrelError::IoError { .. })));
    }

    #[test]
    fn options_default_to_optional_pyproject() {
        let loader = ConfigLoader::from_options(&GlobalCommandLineOptions::default());
        assert_eq!(
            loader.sources,
            vec![Source::File {
                path: DEFAULT_CONFIG_FILE.into(),
                required: false,
            }]
        );
        assert_eq!(loader.env_prefix.as_deref(), Some(DEFAULT_ENV_PREFIX));
    }

    #[test]
    fn validation_error_names_file_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("releaserc.toml");
        fs::write(&path, "[remote]\ntype = \"nonexistent\"\n").unwrap();

        let err = ConfigLoader::new().file(&path).load().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("remote.type"));
        assert!(message.contains("releaserc.toml"));
        assert!(message.contains("line 2"));
    }
}
