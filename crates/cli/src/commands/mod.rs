//! Subcommand implementations.

pub mod annotate;
pub mod diff;
pub mod merge;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a whole file for diffing or merging.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
