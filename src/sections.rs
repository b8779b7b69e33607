//! Release behavior sections that are carried through to later stages:
//! `[branches.*]`, `[changelog]` and `[publish]`.

use regex::Regex;
use serde::Serialize;

use crate::reader::FieldReader;

/// A named group of branches that releases may be made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchConfig {
    /// Regex matched against the start of the active branch name.
    #[serde(rename = "match")]
    pub pattern: String,
    pub prerelease_token: String,
    pub prerelease: bool,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            pattern: "(main|master)".to_string(),
            prerelease_token: "rc".to_string(),
            prerelease: false,
        }
    }
}

impl BranchConfig {
    /// Compile `pattern` anchored at the start of the branch name.
    pub fn matcher(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})", self.pattern))
    }

    pub(crate) fn read(r: &mut FieldReader) -> Self {
        let defaults = Self::default();
        let branch = Self {
            pattern: r.or("match", defaults.pattern),
            prerelease_token: r.or("prerelease_token", defaults.prerelease_token),
            prerelease: r.or("prerelease", defaults.prerelease),
        };
        if let Err(e) = branch.matcher() {
            r.error("match", format!("invalid regex: {e}"));
        }
        if branch.prerelease_token.is_empty() {
            r.error("prerelease_token", "must not be empty");
        }
        branch
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogConfig {
    pub changelog_file: String,
    pub template_dir: String,
    /// Commits whose message matches any of these regexes are left out.
    pub exclude_commit_patterns: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            changelog_file: "CHANGELOG.md".to_string(),
            template_dir: "templates".to_string(),
            exclude_commit_patterns: Vec::new(),
        }
    }
}

impl ChangelogConfig {
    pub fn compiled_exclusions(&self) -> Result<Vec<Regex>, (usize, regex::Error)> {
        self.exclude_commit_patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| Regex::new(pattern).map_err(|e| (i, e)))
            .collect()
    }

    pub(crate) fn read(r: &mut FieldReader) -> Self {
        let defaults = Self::default();
        let changelog = Self {
            changelog_file: r.or("changelog_file", defaults.changelog_file),
            template_dir: r.or("template_dir", defaults.template_dir),
            exclude_commit_patterns: r
                .or("exclude_commit_patterns", defaults.exclude_commit_patterns),
        };
        for (i, pattern) in changelog.exclude_commit_patterns.iter().enumerate() {
            if let Err(e) = Regex::new(pattern) {
                r.error(
                    &format!("exclude_commit_patterns[{i}]"),
                    format!("invalid regex: {e}"),
                );
            }
        }
        changelog
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishConfig {
    pub dist_glob_patterns: Vec<String>,
    pub upload_to_vcs_release: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            dist_glob_patterns: vec!["dist/*".to_string()],
            upload_to_vcs_release: true,
        }
    }
}

impl PublishConfig {
    pub(crate) fn read(r: &mut FieldReader) -> Self {
        let defaults = Self::default();
        Self {
            dist_glob_patterns: r.or("dist_glob_patterns", defaults.dist_glob_patterns),
            upload_to_vcs_release: r.or("upload_to_vcs_release", defaults.upload_to_vcs_release),
        }
    }
}
