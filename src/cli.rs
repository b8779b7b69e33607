//! Command-line options shared by every release command.
//!
//! [`GlobalCommandLineOptions`] always exists so the library can be driven
//! without a CLI framework. With the `clap` feature (on by default) it also
//! derives [`clap::Args`], so an application can flatten it into its parser:
//!
//! ```ignore
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     global: GlobalCommandLineOptions,
//!     #[command(subcommand)]
//!     command: Commands,
//! }
//! ```
//!
//! Every default means "no override requested".

use std::fmt;
use std::path::PathBuf;

use tracing::level_filters::LevelFilter;

use crate::error::SemrelError;
use crate::merge::deep_merge;
use crate::overrides::overrides_to_table;
use crate::raw::RawConfig;

#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct GlobalCommandLineOptions {
    /// Show what would be done without changing anything.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub noop: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[cfg_attr(
        feature = "clap",
        arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)
    )]
    pub verbosity: u8,

    /// Fail when the provider token is not set.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub strict: bool,

    /// Configuration file to read instead of pyproject.toml.
    #[cfg_attr(feature = "clap", arg(short = 'c', long = "config", global = true))]
    pub config_file: Option<PathBuf>,

    /// Override a configuration value, e.g. `--set remote.type=gitlab`.
    #[cfg_attr(
        feature = "clap",
        arg(
            long = "set",
            value_name = "KEY=VALUE",
            value_parser = crate::overrides::parse_override,
            global = true
        )
    )]
    pub overrides: Vec<(String, String)>,
}

impl fmt::Debug for GlobalCommandLineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overrides: Vec<(&str, &str)> = self
            .overrides
            .iter()
            .map(|(key, value)| {
                if is_secret_key(key) {
                    (key.as_str(), "****")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("GlobalCommandLineOptions")
            .field("noop", &self.noop)
            .field("verbosity", &self.verbosity)
            .field("strict", &self.strict)
            .field("config_file", &self.config_file)
            .field("overrides", &overrides)
            .finish()
    }
}

fn is_secret_key(key: &str) -> bool {
    key == "remote.token" || key.starts_with("remote.token.")
}

impl GlobalCommandLineOptions {
    /// Merge the `--set` overrides over `raw` and validate the result.
    ///
    /// Only the keys that were overridden change. A token that `raw` derived
    /// from `remote.type` is derived again, so `--set remote.type=gitlab`
    /// switches to `GITLAB_TOKEN`.
    pub fn apply(&self, raw: &RawConfig) -> Result<RawConfig, SemrelError> {
        if self.overrides.is_empty() {
            return Ok(raw.clone());
        }
        let overlay = overrides_to_table(&self.overrides)?;
        tracing::debug!(count = self.overrides.len(), "applying command-line overrides");
        let merged = deep_merge(raw.to_table()?, overlay);
        Ok(RawConfig::validate(&merged)?)
    }

    /// Log level selected by `-v` flags; warnings are always shown.
    pub fn level_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
