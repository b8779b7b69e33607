//! Commit author identity and the order it is resolved in.

use std::fmt;
use std::str::FromStr;

use crate::env::{EnvLookup, EnvOrLiteral};
use crate::error::{SemrelError, ValidationFailure};

/// Environment variable that overrides any configured author.
pub const COMMIT_AUTHOR_ENV: &str = "GIT_COMMIT_AUTHOR";

/// Author used when neither the environment nor the config names one.
pub const DEFAULT_COMMIT_AUTHOR: &str = "semantic-release <semantic-release>";

/// A `Name <email>` pair used for release commits and tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "semantic-release".to_string(),
            email: "semantic-release".to_string(),
        }
    }
}

impl fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl FromStr for CommitAuthor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("'{s}' is not in the form 'Name <email>'");
        let (name, rest) = s.trim().rsplit_once('<').ok_or_else(invalid)?;
        let email = rest.strip_suffix('>').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            email: email.trim().to_string(),
        })
    }
}

/// Resolve the author: `GIT_COMMIT_AUTHOR`, then the configured value, then
/// [`DEFAULT_COMMIT_AUTHOR`].
///
/// A configured env reference without a default is required. Whatever text is
/// chosen must parse, otherwise the error is reported against `commit_author`.
pub fn resolve_commit_author<E: EnvLookup + ?Sized>(
    configured: Option<&EnvOrLiteral>,
    env: &E,
) -> Result<CommitAuthor, SemrelError> {
    let (source, text) = if let Some(text) = env.var(COMMIT_AUTHOR_ENV) {
        (COMMIT_AUTHOR_ENV, text)
    } else if let Some(configured) = configured {
        ("commit_author", configured.resolve(env)?)
    } else {
        tracing::debug!("no commit author configured, using {DEFAULT_COMMIT_AUTHOR}");
        return Ok(CommitAuthor::default());
    };

    tracing::debug!(source, "resolved commit author");
    text.parse().map_err(|reason: String| {
        SemrelError::from(ValidationFailure::single(
            "commit_author",
            format!("{reason} (from {source})"),
        ))
    })
}
