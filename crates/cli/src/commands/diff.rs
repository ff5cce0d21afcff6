use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use linehist_core::text::{diff, guess_binary, split_lines};

use super::read_input;
use crate::style;

pub fn run(old: &Path, new: &Path, context: usize) -> Result<ExitCode> {
    let old_bytes = read_input(old)?;
    let new_bytes = read_input(new)?;

    if guess_binary(&old_bytes) || guess_binary(&new_bytes) {
        if old_bytes != new_bytes {
            println!(
                "Binary files {} and {} differ",
                old.display(),
                new.display()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let result = diff(
        &old.display().to_string(),
        &new.display().to_string(),
        &split_lines(&old_bytes),
        &split_lines(&new_bytes),
        context,
    );
    if result.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    for line in result.to_string().lines() {
        println!("{}", style::diff_line(line));
    }
    Ok(ExitCode::SUCCESS)
}
