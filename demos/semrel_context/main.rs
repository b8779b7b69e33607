//! # semrel-config demo application
//!
//! A small CLI that shows how a release tool wires
//! [`semrel_config`] into its startup: parse the global options, load the
//! configuration documents, then build the [`RuntimeContext`]. It does not
//! read git itself; the branch and tags are passed as flags.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example semrel_context -- context
//! cargo run --example semrel_context -- --branch beta/x --tag v1.0.0 context
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature               | How to exercise it                                                     |
//! |-----------------------|------------------------------------------------------------------------|
//! | Compiled defaults     | Run `context` in a directory without `pyproject.toml`                  |
//! | pyproject settings    | Add `[tool.semantic_release]` to `./pyproject.toml`, run `context`     |
//! | Explicit config file  | `-- --config releaserc.json context`                                   |
//! | Env layer             | `SEMANTIC_RELEASE__REMOTE__TYPE=gitlab cargo run --example semrel_context -- context` |
//! | CLI override          | `-- --set remote.type=gitea context`                                   |
//! | Author override       | `GIT_COMMIT_AUTHOR="Bot <bot@example.com>" cargo run --example semrel_context -- context` |
//! | Strict token check    | `-- --strict context` without `GH_TOKEN` set                           |
//! | Default config output | `-- generate-config --nested`                                          |
//! | Key lookup / listing  | `-- get remote.token`, `-- list`                                       |
//! | Logging               | `-- -vv context`                                                       |

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use semrel_config::{
    ConfigLoader, DocumentFormat, GlobalCommandLineOptions, RawConfig, RepositorySnapshot,
    RuntimeContext, SemrelError, generate_config, get_value, list_values,
};

/// semrel-config demo: resolve and print a release runtime context.
#[derive(Parser, Debug)]
#[command(name = "semrel-context")]
struct Cli {
    #[command(flatten)]
    global: GlobalCommandLineOptions,

    /// Branch to pretend is checked out.
    #[arg(long, global = true, default_value = "main")]
    branch: String,

    /// Pretend HEAD is detached.
    #[arg(long, global = true)]
    detached: bool,

    /// Tag to pretend exists (repeatable).
    #[arg(long = "tag", global = true)]
    tags: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the runtime context and print a summary.
    Context,
    /// Print the default configuration.
    GenerateConfig {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
        /// Nest under `tool.semantic_release` (TOML) or `semantic_release` (JSON).
        #[arg(long)]
        nested: bool,
    },
    /// Show one resolved value by dotted key.
    Get { key: String },
    /// Show every resolved value.
    List,
}

fn init_logging(options: &GlobalCommandLineOptions) {
    let filter = EnvFilter::builder()
        .with_default_directive(options.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(cli: &Cli) -> Result<RawConfig, SemrelError> {
    let raw = ConfigLoader::from_options(&cli.global).load()?;
    cli.global.apply(&raw)
}

fn print_context(cli: &Cli, raw: &RawConfig) -> Result<(), SemrelError> {
    let repo = if cli.detached {
        RepositorySnapshot::detached()
    } else {
        RepositorySnapshot::on_branch(&cli.branch)
    }
    .with_tags(cli.tags.iter().cloned());

    let ctx = RuntimeContext::from_raw_config(raw, &repo, &cli.global)?;
    let hvcs = ctx.hvcs();
    let branch = ctx.release_branch();
    let token = match &hvcs.token {
        Some(token) => token.to_string(),
        None => "<not set>".to_string(),
    };

    let entries = [
        ("hvcs", hvcs.client.to_string()),
        ("remote", format!("{} ({})", hvcs.remote_name, hvcs.domain)),
        ("token", token),
        ("commit author", ctx.commit_author().to_string()),
        ("branch", format!("{} [group {}]", branch.name, branch.group)),
        (
            "prerelease",
            if branch.prerelease {
                format!("yes ({})", branch.prerelease_token)
            } else {
                "no".to_string()
            },
        ),
        ("next tag", ctx.format_tag("X.Y.Z")),
        ("has release tags", ctx.has_release_tags().to_string()),
        ("noop", ctx.noop().to_string()),
    ];
    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        println!("{key:<width$}  {value}");
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), SemrelError> {
    match &cli.command {
        Commands::Context => {
            // Overrides are applied inside the context; load the bare documents here.
            let raw = ConfigLoader::from_options(&cli.global).load()?;
            print_context(cli, &raw)
        }
        Commands::GenerateConfig { json, nested } => {
            let format = if *json {
                DocumentFormat::Json
            } else {
                DocumentFormat::Toml
            };
            println!("{}", generate_config(format, *nested)?);
            Ok(())
        }
        Commands::Get { key } => {
            println!("{}", get_value(&load(cli)?, key)?);
            Ok(())
        }
        Commands::List => {
            for (key, value) in list_values(&load(cli)?)? {
                println!("{key} = {value}");
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    if let Err(e) = run(&cli) {
        eprintln!("semrel-context: {e}");
        std::process::exit(1);
    }
}
