//! TOML description of a revision history.
//!
//! ```toml
//! [[revision]]
//! id = "r1"
//! author = "alice"
//! date = "2024-03-01T12:00:00Z"
//!
//! [[revision.file]]
//! path = "hello.c"
//! source = "r1/hello.c"      # relative to the manifest
//!
//! [[revision]]
//! id = "r2"
//! parents = ["r1"]
//!
//! [[revision.file]]
//! path = "greet.c"
//! content = "..."
//!
//! [[revision.rename]]
//! parent = "r1"
//! from = "hello.c"
//! to = "greet.c"
//! ```
//!
//! Revisions are listed parents first.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::memory::{MemoryHistory, NewRevision};
use crate::errors::HistoryError;

/// A parsed history manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryManifest {
    #[serde(default, rename = "revision")]
    pub revisions: Vec<ManifestRevision>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRevision {
    pub id: String,

    #[serde(default)]
    pub parents: Vec<String>,

    #[serde(default)]
    pub author: Option<String>,

    /// RFC 3339 timestamp, written as a quoted string.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, rename = "file")]
    pub files: Vec<ManifestFile>,

    #[serde(default, rename = "rename")]
    pub renames: Vec<ManifestRename>,
}

/// One file of a revision. Exactly one of `content` and `source` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRename {
    pub parent: String,
    pub from: String,
    pub to: String,
}

impl HistoryManifest {
    pub fn parse(text: &str) -> Result<Self, HistoryError> {
        toml::from_str(text).map_err(|e| HistoryError::ManifestParse(e.to_string()))
    }

    /// Load a manifest and build the history it describes. `source` paths
    /// are resolved against the manifest's directory.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<MemoryHistory, HistoryError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading history manifest");

        let text = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.into_history(base)
    }

    /// Build a [`MemoryHistory`], reading `source` files relative to `base`.
    pub fn into_history(self, base: &Path) -> Result<MemoryHistory, HistoryError> {
        let mut history = MemoryHistory::new();

        for revision in self.revisions {
            let mut new = NewRevision::new(revision.id.clone());
            for parent in revision.parents {
                new = new.parent(parent);
            }
            if let Some(author) = revision.author {
                new = new.author(author);
            }
            if let Some(date) = revision.date {
                new = new.date(date);
            }
            for file in revision.files {
                let content = match (file.content, file.source) {
                    (Some(content), None) => content.into_bytes(),
                    (None, Some(source)) => {
                        let source_path = base.join(&source);
                        debug!(source = %source_path.display(), "reading file source");
                        std::fs::read(&source_path)?
                    }
                    _ => {
                        return Err(HistoryError::ManifestInvalid(format!(
                            "file '{}' in revision '{}' needs exactly one of `content` or `source`",
                            file.path, revision.id
                        )))
                    }
                };
                new = new.file(file.path, content);
            }
            for rename in revision.renames {
                new = new.rename(rename.parent, rename.from, rename.to);
            }
            history.add_revision(new)?;
        }

        info!(revisions = history.len(), "history loaded");
        Ok(history)
    }
}
