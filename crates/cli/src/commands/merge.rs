use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use linehist_core::config::MergeFallback;
use linehist_core::merge::{MergeOutcome, MergeProvider};

use super::read_input;
use crate::{style, EXIT_INCOMPLETE};

pub fn run(
    ancestor: &Path,
    left: &Path,
    right: &Path,
    output: Option<&Path>,
    fallback: MergeFallback,
) -> Result<ExitCode> {
    let ancestor_bytes = read_input(ancestor)?;
    let left_bytes = read_input(left)?;
    let right_bytes = read_input(right)?;

    let provider = MergeProvider::new(fallback);
    match provider.try_merge(&ancestor_bytes, &left_bytes, &right_bytes) {
        MergeOutcome::Clean { content, file_id } => {
            info!(%file_id, "merged cleanly");
            emit(output, &content)?;
            Ok(ExitCode::SUCCESS)
        }
        MergeOutcome::Conflicted { content, conflict } => {
            emit(output, &content)?;
            eprintln!(
                "{}",
                style::warn(&format!(
                    "{}; conflict markers written, resolve them by hand",
                    conflict
                ))
            );
            Ok(ExitCode::from(EXIT_INCOMPLETE))
        }
        MergeOutcome::Conflict(conflict) => {
            eprintln!("{}", style::error(&conflict.to_string()));
            eprintln!("  rerun with --fallback markers to write a file with conflict markers");
            Ok(ExitCode::from(EXIT_INCOMPLETE))
        }
        MergeOutcome::Binary => {
            eprintln!(
                "{}",
                style::error("binary files changed on both sides; cannot merge")
            );
            Ok(ExitCode::from(EXIT_INCOMPLETE))
        }
    }
}

fn emit(output: Option<&Path>, content: &[u8]) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => std::io::stdout()
            .write_all(content)
            .context("failed to write merged content"),
    }
}
