//! Validated, layered configuration for release automation, resolved into a
//! single immutable [`RuntimeContext`] before any release action runs.
//!
//! A release tool reads a partially written configuration document, the
//! environment, command-line flags, and the state of the git repository.
//! This crate turns all of that into one typed value up front, so version
//! computation, changelog writing, and publishing never see a half-checked
//! setting or an unset credential.
//!
//! ```ignore
//! let options = GlobalCommandLineOptions::default();
//! let raw = ConfigLoader::from_options(&options).load()?;
//! let ctx = RuntimeContext::from_raw_config(&raw, &repo, &options)?;
//! println!("releasing {} as {}", ctx.release_branch().name, ctx.commit_author());
//! ```
//!
//! # Two stages
//!
//! - **[`RawConfig`]** is the document, validated. It depends only on its
//!   input: types are checked, enum members are checked, unknown keys are
//!   rejected at every level, and defaults that depend on other fields are
//!   filled in. Environment references stay unresolved, so a `RawConfig` can
//!   be serialized back out without leaking secrets.
//! - **[`RuntimeContext`]** is everything a command needs. Building it
//!   merges command-line overrides, resolves every environment reference
//!   exactly once, picks the release group for the active branch, and checks
//!   the repository's tags.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     RawConfig::default()
//!        ↑ overridden by
//! Documents             ConfigLoader sources in order, later documents win
//!        ↑ overridden by
//! Environment vars      SEMANTIC_RELEASE__SECTION__KEY
//!        ↑ overridden by
//! CLI overrides         --set KEY=VALUE
//! ```
//!
//! Every layer is **sparse**. A document, an env var, or a `--set` flag only
//! needs to name the keys it changes; everything else falls through to the
//! layer below. Precedence is per field: `--set remote.type=gitlab` changes
//! the platform and nothing else.
//!
//! # Documents
//!
//! TOML and JSON are accepted, chosen by file extension. Settings are read
//! from `[tool.semantic_release]` in a `pyproject.toml`, from a top-level
//! `semantic_release` table, or from the whole document, in that order. The
//! default `pyproject.toml` may be missing; a file named with `--config`
//! must exist.
//!
//! # Derived defaults
//!
//! `remote.token` defaults to the token variable of the configured platform:
//!
//! | `remote.type` | token variable |
//! |---------------|----------------|
//! | `github` (default) | `GH_TOKEN` |
//! | `gitlab` | `GITLAB_TOKEN` |
//! | `gitea` | `GITEA_TOKEN` |
//! | `bitbucket` | `BITBUCKET_TOKEN` |
//!
//! [`RemoteConfig::token`] returns the configured token or this derived one.
//! Only a configured token is written back out, so a later change of
//! `remote.type` (from another layer or `--set`) picks the matching variable.
//! An omitted `[remote]` table behaves exactly like an empty one.
//!
//! # Environment references
//!
//! Any credential-like setting can be written inline or as a reference:
//!
//! ```toml
//! [remote]
//! token = { env = "CI_JOB_TOKEN" }
//! url = { env = "RELEASE_REMOTE_URL", default = "https://gitlab.com/acme/app.git" }
//! ```
//!
//! References are [`EnvConfigVar`]s: compared structurally and resolved
//! through an [`EnvLookup`] at context construction. A reference without a
//! default whose variable is unset is a [`ResolutionFailure`]. The derived
//! platform token is the one exception: when it is unset the context simply
//! has no token and a warning is logged, unless `--strict` is given.
//!
//! The commit author comes from `GIT_COMMIT_AUTHOR` if set, then
//! `commit_author`, then `semantic-release <semantic-release>`.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`GlobalCommandLineOptions`]
//! derives `clap::Args` and can be flattened into any parser. Without it the
//! struct is still available and can be filled in by hand.
//!
//! # Error handling
//!
//! All fallible operations return [`SemrelError`]. Each document is checked
//! on its own for types and unknown keys; rules that relate several settings,
//! such as `remote.insecure` for an `http://` domain, are checked once the
//! layers are merged. Validation collects every independent problem into one
//! [`ValidationFailure`], each entry naming the dotted path (`remote.type`),
//! the reason, and, for TOML files, the line:
//!
//! ```text
//! 2 validation errors in configuration /repo/pyproject.toml
//!   remote.type: unknown variant `svn`, expected one of `bitbucket`, `gitea`, `github`, `gitlab` (line 12)
//!   tag_formt: unknown key (line 4)
//! ```

pub mod error;
pub mod types;

mod author;
mod cli;
mod context;
mod document;
mod env;
mod loader;
pub(crate) mod merge;
mod ops;
mod overrides;
mod raw;
mod reader;
mod remote;
mod repo;
mod resolve;
mod sections;
mod validate;

#[cfg(test)]
mod fixtures;

pub use author::{COMMIT_AUTHOR_ENV, CommitAuthor, DEFAULT_COMMIT_AUTHOR, resolve_commit_author};
pub use cli::GlobalCommandLineOptions;
pub use context::{HvcsSettings, ReleaseBranch, RuntimeContext, Secret};
pub use document::{DEFAULT_CONFIG_FILE, SECTION_NAME};
pub use env::{EnvConfigVar, EnvLookup, EnvOrLiteral, ProcessEnv, env_to_table, parse_scalar};
pub use error::{FieldError, ResolutionFailure, SemrelError, ValidationFailure};
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use ops::{generate_config, get_value, list_values};
pub use overrides::{overrides_to_table, parse_override};
pub use raw::{
    DEFAULT_COMMIT_MESSAGE, DEFAULT_COMMIT_PARSER, DEFAULT_TAG_FORMAT, RawConfig,
    VERSION_PLACEHOLDER,
};
pub use remote::{DEFAULT_REMOTE_NAME, RemoteConfig};
pub use repo::{RepositoryError, RepositoryHandle, RepositorySnapshot};
pub use resolve::{ResolveInput, resolve};
pub use sections::{BranchConfig, ChangelogConfig, PublishConfig};
pub use types::{DocumentFormat, HvcsClient};
