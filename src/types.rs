use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::EnvConfigVar;

/// Which code-hosting platform the remote repository lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvcsClient {
    Bitbucket,
    Gitea,
    #[default]
    Github,
    Gitlab,
}

impl HvcsClient {
    pub const ALL: [HvcsClient; 4] = [
        HvcsClient::Bitbucket,
        HvcsClient::Gitea,
        HvcsClient::Github,
        HvcsClient::Gitlab,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HvcsClient::Bitbucket => "bitbucket",
            HvcsClient::Gitea => "gitea",
            HvcsClient::Github => "github",
            HvcsClient::Gitlab => "gitlab",
        }
    }

    /// Name of the environment variable holding this platform's token when
    /// `remote.token` is not configured.
    pub fn default_token_env(self) -> &'static str {
        match self {
            HvcsClient::Bitbucket => "BITBUCKET_TOKEN",
            HvcsClient::Gitea => "GITEA_TOKEN",
            HvcsClient::Github => "GH_TOKEN",
            HvcsClient::Gitlab => "GITLAB_TOKEN",
        }
    }

    pub fn default_token(self) -> EnvConfigVar {
        EnvConfigVar::new(self.default_token_env())
    }

    /// Public host used when `remote.domain` is not set.
    pub fn default_domain(self) -> &'static str {
        match self {
            HvcsClient::Bitbucket => "bitbucket.org",
            HvcsClient::Gitea => "gitea.com",
            HvcsClient::Github => "github.com",
            HvcsClient::Gitlab => "gitlab.com",
        }
    }
}

impl fmt::Display for HvcsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvcsClient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HvcsClient::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = HvcsClient::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown hosting provider '{s}', expected one of {}", known.join(", "))
            })
    }
}

/// Text format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Toml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything other than `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_github() {
        assert_eq!(HvcsClient::default(), HvcsClient::Github);
    }

    #[test]
    fn every_kind_has_distinct_token_variable() {
        let mut names: Vec<&str> = HvcsClient::ALL
            .iter()
            .map(|k| k.default_token_env())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), HvcsClient::ALL.len());
    }

    #[test]
    fn parse_known_kind() {
        assert_eq!("gitea".parse::<HvcsClient>().unwrap(), HvcsClient::Gitea);
    }

    #[test]
    fn parse_unknown_kind_lists_choices() {
        let err = "svn".parse::<HvcsClient>().unwrap_err();
        assert!(err.contains("svn"));
        assert!(err.contains("github"));
        assert!(err.contains("bitbucket"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let value = toml::Value::try_from(HvcsClient::Gitlab).unwrap();
        assert_eq!(value.as_str(), Some("gitlab"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("releaserc.json")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("pyproject.toml")),
            DocumentFormat::Toml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("no_extension")),
            DocumentFormat::Toml
        );
    }
}
