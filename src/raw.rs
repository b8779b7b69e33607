//! [`RawConfig`]: the validated configuration document, before any
//! environment or command-line context is applied.

use std::collections::BTreeMap;

use serde::Serialize;
use toml::{Table, Value};

use crate::author::CommitAuthor;
use crate::env::EnvOrLiteral;
use crate::error::{FieldError, SemrelError, ValidationFailure};
use crate::reader::FieldReader;
use crate::remote::RemoteConfig;
use crate::sections::{BranchConfig, ChangelogConfig, PublishConfig};

pub const DEFAULT_COMMIT_MESSAGE: &str =
    "{version}\n\nAutomatically generated by semantic-release";
pub const DEFAULT_COMMIT_PARSER: &str = "angular";
pub const DEFAULT_TAG_FORMAT: &str = "v{version}";

/// Placeholder every `tag_format` must contain.
pub const VERSION_PLACEHOLDER: &str = "{version}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawConfig {
    /// Extra files to stage in the release commit.
    pub assets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    pub commit_message: String,
    pub commit_parser: String,
    pub logging_use_named_masks: bool,
    pub major_on_zero: bool,
    pub allow_zero_version: bool,
    pub no_git_verify: bool,
    pub tag_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_toml: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_variables: Option<Vec<String>>,
    /// `Name <email>`, either inline or from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author: Option<EnvOrLiteral>,
    /// Free-form options handed to the commit parser.
    pub commit_parser_options: Table,
    pub branches: BTreeMap<String, BranchConfig>,
    pub changelog: ChangelogConfig,
    pub publish: PublishConfig,
    pub remote: RemoteConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            build_command: None,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            commit_parser: DEFAULT_COMMIT_PARSER.to_string(),
            logging_use_named_masks: false,
            major_on_zero: true,
            allow_zero_version: true,
            no_git_verify: false,
            tag_format: DEFAULT_TAG_FORMAT.to_string(),
            version_toml: None,
            version_variables: None,
            commit_author: None,
            commit_parser_options: Table::new(),
            branches: BTreeMap::from([("main".to_string(), BranchConfig::default())]),
            changelog: ChangelogConfig::default(),
            publish: PublishConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl RawConfig {
    /// Validate a configuration document.
    ///
    /// Every problem is collected before returning, each tagged with its dotted
    /// path. Omitted keys take their defaults; unknown keys are rejected.
    pub fn validate(document: &Table) -> Result<Self, ValidationFailure> {
        let (config, mut errors, constraints) = Self::read(document);
        errors.extend(constraints);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ValidationFailure::new(errors))
        }
    }

    /// Check a single layer before it is merged.
    ///
    /// Types, enum members and unknown keys are checked. Rules that relate
    /// several settings (`tag_format` placeholder, non-empty `branches`,
    /// `remote.insecure` for http domains) are left to the merged result,
    /// since another layer may still satisfy them.
    pub(crate) fn check_layer(document: &Table) -> Result<(), ValidationFailure> {
        let (_, errors, _) = Self::read(document);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(errors))
        }
    }

    fn read(document: &Table) -> (Self, Vec<FieldError>, Vec<FieldError>) {
        let mut r = FieldReader::new(document.clone());
        let d = Self::default();

        let commit_author: Option<EnvOrLiteral> = r.optional("commit_author");
        if let Some(EnvOrLiteral::Literal(text)) = &commit_author
            && let Err(reason) = text.parse::<CommitAuthor>()
        {
            r.error("commit_author", reason);
        }

        let tag_format: String = r.or("tag_format", d.tag_format);
        if !tag_format.contains(VERSION_PLACEHOLDER) {
            r.constraint(
                "tag_format",
                format!("'{tag_format}' must contain {VERSION_PLACEHOLDER}"),
            );
        }

        let branches = match r.sections("branches") {
            None => d.branches,
            Some(entries) => {
                let mut branches = BTreeMap::new();
                for (name, mut entry) in entries {
                    branches.insert(name, BranchConfig::read(&mut entry));
                    r.absorb(entry);
                }
                if branches.is_empty() {
                    r.constraint("branches", "at least one release group is required");
                }
                branches
            }
        };

        let mut section = r.section("changelog");
        let changelog = ChangelogConfig::read(&mut section);
        r.absorb(section);

        let mut section = r.section("publish");
        let publish = PublishConfig::read(&mut section);
        r.absorb(section);

        let mut section = r.section("remote");
        let remote = RemoteConfig::read(&mut section);
        r.absorb(section);

        let config = Self {
            assets: r.or("assets", d.assets),
            build_command: r.optional("build_command"),
            commit_message: r.or("commit_message", d.commit_message),
            commit_parser: r.or("commit_parser", d.commit_parser),
            logging_use_named_masks: r.or("logging_use_named_masks", d.logging_use_named_masks),
            major_on_zero: r.or("major_on_zero", d.major_on_zero),
            allow_zero_version: r.or("allow_zero_version", d.allow_zero_version),
            no_git_verify: r.or("no_git_verify", d.no_git_verify),
            tag_format,
            version_toml: r.optional("version_toml"),
            version_variables: r.optional("version_variables"),
            commit_author,
            commit_parser_options: r.or("commit_parser_options", d.commit_parser_options),
            branches,
            changelog,
            publish,
            remote,
        };

        let (errors, constraints) = r.finish_split();
        (config, errors, constraints)
    }

    /// Parse TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, SemrelError> {
        let document: Table = toml::from_str(content).map_err(|e| SemrelError::ParseError {
            path: "<inline>".into(),
            source: e,
        })?;
        Ok(Self::validate(&document)?)
    }

    /// Serialize back into a document table; `validate` accepts the result.
    ///
    /// A token derived from `remote.type` is left out, so merging a new type
    /// over the table derives it again.
    pub fn to_table(&self) -> Result<Table, SemrelError> {
        match Value::try_from(self) {
            Ok(Value::Table(table)) => Ok(table),
            Ok(other) => Err(SemrelError::Render(format!(
                "configuration serialized to {} instead of a table",
                other.type_str()
            ))),
            Err(e) => Err(SemrelError::Render(e.to_string())),
        }
    }
}
