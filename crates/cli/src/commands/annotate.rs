use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

use linehist_core::annotate::{annotate_path, AnnotateReport};
use linehist_core::history::{HistoryManifest, MemoryHistory, RevisionId};

use crate::{style, EXIT_INCOMPLETE};

pub fn run(
    manifest: &Path,
    revision: &str,
    path: &str,
    as_json: bool,
    width: usize,
) -> Result<ExitCode> {
    let history = HistoryManifest::load_from_file(manifest)
        .with_context(|| format!("failed to load history from {}", manifest.display()))?;
    let revision = RevisionId::new(revision);
    let report = annotate_path(&history, &revision, path)
        .with_context(|| format!("failed to annotate {} at {}", path, revision))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&to_json(&history, &report))?);
    } else {
        print!("{}", report.render(width));
        println!();
        print_legend(&history, &report, width);
    }

    if report.complete {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{}",
            style::warn(&format!(
                "{} line(s) could not be attributed; the history is inconsistent",
                report.unattributed()
            ))
        );
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    }
}

fn author_and_date(history: &MemoryHistory, revision: &RevisionId) -> (String, String) {
    let info = history.revision_info(revision);
    let author = info
        .and_then(|i| i.author.clone())
        .unwrap_or_else(|| "-".to_string());
    let date = info
        .and_then(|i| i.date)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    (author, date)
}

fn print_legend(history: &MemoryHistory, report: &AnnotateReport, width: usize) {
    if report.revisions.is_empty() {
        println!("{}", style::dim("(empty file)"));
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Revision", "Author", "Date", "Lines"]);

    for revision in &report.revisions {
        let (author, date) = author_and_date(history, revision);
        let lines = report
            .lines
            .iter()
            .filter(|l| l.revision.as_ref() == Some(revision))
            .count();
        table.add_row(vec![
            Cell::new(revision.short(width)),
            Cell::new(author),
            Cell::new(date),
            Cell::new(lines),
        ]);
    }

    println!("{table}");
}

fn to_json(history: &MemoryHistory, report: &AnnotateReport) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = report
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            json!({
                "line": index + 1,
                "revision": line.revision.as_ref().map(RevisionId::as_str),
                "text": String::from_utf8_lossy(&line.text),
            })
        })
        .collect();
    let revisions: Vec<serde_json::Value> = report
        .revisions
        .iter()
        .map(|revision| {
            let info = history.revision_info(revision);
            json!({
                "id": revision.as_str(),
                "author": info.and_then(|i| i.author.as_deref()),
                "date": info.and_then(|i| i.date).map(|d| d.to_rfc3339()),
            })
        })
        .collect();

    json!({
        "complete": report.complete,
        "lines": lines,
        "revisions": revisions,
    })
}
