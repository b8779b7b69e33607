//! [`RuntimeContext`]: everything a release command needs, resolved up front.
//!
//! Construction runs in a fixed order and stops at the first failure, so a
//! context either exists completely or not at all:
//!
//! 1. Merge command-line overrides over the validated config
//! 2. Resolve the provider token and the remote URL
//! 3. Resolve the commit author
//! 4. Select the release group for the active branch
//! 5. Compile the tag pattern and check the repository's tags against it
//! 6. Compile the changelog exclusion patterns

use std::fmt;

use regex::Regex;

use crate::author::{CommitAuthor, resolve_commit_author};
use crate::cli::GlobalCommandLineOptions;
use crate::env::{EnvLookup, EnvOrLiteral, ProcessEnv};
use crate::error::{ResolutionFailure, SemrelError, ValidationFailure};
use crate::raw::{RawConfig, VERSION_PLACEHOLDER};
use crate::remote::RemoteConfig;
use crate::repo::RepositoryHandle;
use crate::types::HvcsClient;

const SECRET_MASK: &str = "****";

/// Semantic version as it appears inside a tag.
const SEMVER_PATTERN: &str =
    r"\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?";

/// A credential. `Debug` and `Display` print only the mask.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    value: String,
    mask: String,
}

impl Secret {
    pub fn new(value: impl Into<String>, mask: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            mask: mask.into(),
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mask)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mask)
    }
}

/// The hosting platform with every reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HvcsSettings {
    pub client: HvcsClient,
    pub remote_name: String,
    /// `remote.domain`, or the platform's public host.
    pub domain: String,
    pub api_domain: Option<String>,
    pub url: Option<String>,
    /// `None` when the derived token variable is unset outside strict mode.
    pub token: Option<Secret>,
    pub ignore_token_for_push: bool,
    pub insecure: bool,
}

/// The release group the active branch belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub group: String,
    pub name: String,
    pub prerelease: bool,
    pub prerelease_token: String,
}

#[derive(Debug)]
pub struct RuntimeContext<'repo, R: RepositoryHandle + ?Sized> {
    repo: &'repo R,
    config: RawConfig,
    hvcs: HvcsSettings,
    commit_author: CommitAuthor,
    release_branch: ReleaseBranch,
    tag_pattern: Regex,
    has_release_tags: bool,
    changelog_excludes: Vec<Regex>,
    global_cli_options: GlobalCommandLineOptions,
}

impl<'repo, R: RepositoryHandle + ?Sized> RuntimeContext<'repo, R> {
    /// Build the context against the process environment.
    pub fn from_raw_config(
        raw: &RawConfig,
        repo: &'repo R,
        global_cli_options: &GlobalCommandLineOptions,
    ) -> Result<Self, SemrelError> {
        Self::from_raw_config_with_env(raw, repo, global_cli_options, &ProcessEnv)
    }

    pub fn from_raw_config_with_env<E: EnvLookup + ?Sized>(
        raw: &RawConfig,
        repo: &'repo R,
        global_cli_options: &GlobalCommandLineOptions,
        env: &E,
    ) -> Result<Self, SemrelError> {
        let config = global_cli_options.apply(raw)?;

        let hvcs = resolve_hvcs(
            &config.remote,
            global_cli_options.strict,
            config.logging_use_named_masks,
            env,
        )?;
        let commit_author = resolve_commit_author(config.commit_author.as_ref(), env)?;
        let release_branch = select_release_branch(&config, &repo.active_branch()?)?;

        let tag_pattern = tag_regex(&config.tag_format)?;
        let has_release_tags = repo
            .tag_names()
            .iter()
            .any(|tag| tag_pattern.is_match(tag));

        let changelog_excludes = config.changelog.compiled_exclusions().map_err(|(i, e)| {
            ValidationFailure::single(
                format!("changelog.exclude_commit_patterns[{i}]"),
                e.to_string(),
            )
        })?;

        tracing::debug!(
            hvcs = %hvcs.client,
            branch = %release_branch.name,
            group = %release_branch.group,
            has_release_tags,
            noop = global_cli_options.noop,
            "runtime context ready"
        );

        Ok(Self {
            repo,
            config,
            hvcs,
            commit_author,
            release_branch,
            tag_pattern,
            has_release_tags,
            changelog_excludes,
            global_cli_options: global_cli_options.clone(),
        })
    }

    pub fn repo(&self) -> &'repo R {
        self.repo
    }

    /// The configuration after command-line overrides.
    pub fn config(&self) -> &RawConfig {
        &self.config
    }

    pub fn hvcs(&self) -> &HvcsSettings {
        &self.hvcs
    }

    pub fn commit_author(&self) -> &CommitAuthor {
        &self.commit_author
    }

    pub fn release_branch(&self) -> &ReleaseBranch {
        &self.release_branch
    }

    /// Matches tags produced by `tag_format`; the `version` group captures the version.
    pub fn tag_pattern(&self) -> &Regex {
        &self.tag_pattern
    }

    /// Whether any tag in the repository matches [`tag_pattern`](Self::tag_pattern).
    pub fn has_release_tags(&self) -> bool {
        self.has_release_tags
    }

    pub fn changelog_excludes(&self) -> &[Regex] {
        &self.changelog_excludes
    }

    pub fn global_cli_options(&self) -> &GlobalCommandLineOptions {
        &self.global_cli_options
    }

    pub fn noop(&self) -> bool {
        self.global_cli_options.noop
    }

    /// Render the tag name for `version`.
    pub fn format_tag(&self, version: &str) -> String {
        self.config.tag_format.replace(VERSION_PLACEHOLDER, version)
    }

    /// The version inside `tag`, if it was produced by `tag_format`.
    pub fn version_from_tag<'t>(&self, tag: &'t str) -> Option<&'t str> {
        self.tag_pattern
            .captures(tag)
            .and_then(|c| c.name("version"))
            .map(|m| m.as_str())
    }
}

fn resolve_hvcs<E: EnvLookup + ?Sized>(
    remote: &RemoteConfig,
    strict: bool,
    named_masks: bool,
    env: &E,
) -> Result<HvcsSettings, SemrelError> {
    let configured = remote.token();
    let token = if remote.token_is_derived() {
        let var = remote.kind.default_token_env();
        match configured.lookup(env) {
            Some(value) => Some(value),
            None if strict => return Err(ResolutionFailure::new(var).into()),
            None => {
                tracing::warn!(var, hvcs = %remote.kind, "provider token not set; remote actions will be unauthenticated");
                None
            }
        }
    } else {
        Some(configured.resolve(env)?)
    };

    let mask = match configured.as_env() {
        Some(var) if named_masks => format!("<{}>", var.env),
        _ => SECRET_MASK.to_string(),
    };

    let url = remote
        .url
        .as_ref()
        .map(|url: &EnvOrLiteral| url.resolve(env))
        .transpose()?;

    Ok(HvcsSettings {
        client: remote.kind,
        remote_name: remote.name.clone(),
        domain: remote
            .domain
            .clone()
            .unwrap_or_else(|| remote.kind.default_domain().to_string()),
        api_domain: remote.api_domain.clone(),
        url,
        token: token.map(|value| Secret::new(value, mask)),
        ignore_token_for_push: remote.ignore_token_for_push,
        insecure: remote.insecure,
    })
}

/// First group, in name order, whose `match` pattern matches `branch` from its start.
fn select_release_branch(config: &RawConfig, branch: &str) -> Result<ReleaseBranch, SemrelError> {
    for (group, settings) in &config.branches {
        let matcher = settings.matcher().map_err(|e| {
            ValidationFailure::single(format!("branches.{group}.match"), e.to_string())
        })?;
        if matcher.is_match(branch) {
            tracing::debug!(branch, group = %group, "selected release group");
            return Ok(ReleaseBranch {
                group: group.clone(),
                name: branch.to_string(),
                prerelease: settings.prerelease,
                prerelease_token: settings.prerelease_token.clone(),
            });
        }
    }
    Err(SemrelError::NotAReleaseBranch {
        branch: branch.to_string(),
        groups: config
            .branches
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// `v{version}` → `^v(?P<version>1.2.3…)$`. Later placeholders match without capturing.
fn tag_regex(tag_format: &str) -> Result<Regex, ValidationFailure> {
    let escaped = regex::escape(tag_format);
    let placeholder = regex::escape(VERSION_PLACEHOLDER);
    let pattern = escaped
        .replacen(&placeholder, &format!("(?P<version>{SEMVER_PATTERN})"), 1)
        .replace(&placeholder, &format!("(?:{SEMVER_PATTERN})"));
    Regex::new(&format!("^{pattern}$"))
        .map_err(|e| ValidationFailure::single("tag_format", e.to_string()))
}
