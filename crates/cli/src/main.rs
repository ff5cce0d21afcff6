//! linehist command-line tool.
//!
//! Provides subcommands for diffing two files, three-way merging, annotating
//! a file from a history manifest, and generating / validating the
//! configuration file.

mod commands;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use linehist_core::config::{Config, MergeFallback};

/// Exit status for a merge conflict or an incomplete annotation.
pub const EXIT_INCOMPLETE: u8 = 1;
/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 2;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// linehist command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "linehist",
    version,
    about = "Line-oriented diff, three-way merge and revision-aware annotate"
)]
struct Cli {
    /// Path to the TOML configuration file
    /// (default: <config dir>/linehist/config.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a unified diff between two files.
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Context lines around each hunk (default from config).
        #[arg(short = 'U', long)]
        context: Option<usize>,
    },

    /// Three-way merge LEFT and RIGHT against their common ANCESTOR.
    Merge {
        ancestor: PathBuf,
        left: PathBuf,
        right: PathBuf,

        /// Write the merged file here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do on conflict: none or markers (default from config).
        #[arg(long)]
        fallback: Option<MergeFallback>,
    },

    /// Attribute each line of a file to the revision that introduced it.
    Annotate {
        /// History manifest (TOML) describing the revisions.
        #[arg(long)]
        history: PathBuf,

        /// Revision to annotate.
        #[arg(short, long)]
        revision: String,

        /// Path of the file in that revision.
        path: String,

        /// Print the attribution as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file (default: the
        /// configuration path).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Init { output } => {
            init_tracing(None);
            cmd_init(output.as_deref().unwrap_or(&config_path))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate => {
            init_tracing(None);
            cmd_validate(&config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let config = load_config(&config_path)?;
            init_tracing(Some(&config));

            match command {
                Commands::Diff { old, new, context } => commands::diff::run(
                    &old,
                    &new,
                    context.unwrap_or(config.diff.context_lines),
                ),
                Commands::Merge {
                    ancestor,
                    left,
                    right,
                    output,
                    fallback,
                } => commands::merge::run(
                    &ancestor,
                    &left,
                    &right,
                    output.as_deref(),
                    fallback.unwrap_or(config.merge.fallback),
                ),
                Commands::Annotate {
                    history,
                    revision,
                    path,
                    json,
                } => commands::annotate::run(
                    &history,
                    &revision,
                    &path,
                    json,
                    config.annotate.revision_id_width,
                ),
                Commands::Init { .. } | Commands::Validate => unreachable!(),
            }
        }
    }
}

/// `RUST_LOG` wins, then the configured level, then `warn`.
fn init_tracing(config: Option<&Config>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.map(|c| c.log.level.as_str()).unwrap_or("warn");
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine the user config directory")?;
    Ok(dir.join("linehist").join("config.toml"))
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Config subcommands
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, Config::default_toml()).context("failed to write config file")?;

    println!(
        "{}",
        style::success(&format!("Default configuration written to {}", output.display()))
    );
    println!();
    println!("Next steps:");
    println!("  1. Adjust the diff context, merge fallback and annotate width");
    println!(
        "  2. Validate with: linehist validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let config = Config::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  {}", style::success("TOML structure is valid"));

    match config.validate() {
        Ok(()) => {
            println!("  {}", style::success("All values are within range"));
        }
        Err(e) => {
            println!("  {}", style::error(&format!("Validation error: {}", e)));
            anyhow::bail!("configuration validation failed");
        }
    }

    let fallback = match config.merge.fallback {
        MergeFallback::None => "none",
        MergeFallback::Markers => "markers",
    };

    println!();
    println!("{}", style::header("Configuration summary:"));
    println!("  Diff context lines : {}", config.diff.context_lines);
    println!("  Merge fallback     : {}", fallback);
    println!("  Revision width     : {}", config.annotate.revision_id_width);
    println!("  Log level          : {}", config.log.level);
    println!();
    println!("Configuration is valid.");

    Ok(())
}
