//! Revision history collaborators.
//!
//! The annotate traversal does not own any storage. It reads file content
//! through a [`ContentStore`] and walks parent edges through a
//! [`RevisionGraph`]; anything implementing both is a [`History`].
//! [`MemoryHistory`] is an in-memory implementation, and [`HistoryManifest`]
//! loads one from a TOML description.

pub mod manifest;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::HistoryError;

pub use manifest::HistoryManifest;
pub use memory::{MemoryHistory, NewRevision, RevisionInfo};

/// Identifier of one revision in the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `width` characters, for narrow display columns.
    pub fn short(&self, width: usize) -> &str {
        match self.0.char_indices().nth(width) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Content address of one file version: lowercase hex SHA-256 of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn for_content(content: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(content)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to a file along one parent edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// Same content in parent and child.
    Unchanged,
    /// The content differs.
    Modified,
    /// The file does not exist in the parent.
    Added,
}

/// One parent of a revision, seen from a particular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentEdge {
    pub parent: RevisionId,
    /// Path of the file in the parent; differs from the child's path when
    /// the file was renamed on this edge.
    pub parent_path: String,
    pub change: FileChange,
}

/// Content-addressed file storage.
pub trait ContentStore {
    fn file_content(&self, file_id: &FileId) -> Result<Vec<u8>, HistoryError>;
}

/// Parent edges and path resolution of a revision DAG.
pub trait RevisionGraph {
    /// The parent edges of `revision`, classified for the file at `path`.
    /// A root revision has none.
    fn parent_edges(
        &self,
        revision: &RevisionId,
        path: &str,
    ) -> Result<Vec<ParentEdge>, HistoryError>;

    /// The file id at `path` in `revision`, or `None` if there is no such
    /// file.
    fn resolve_file_id(
        &self,
        revision: &RevisionId,
        path: &str,
    ) -> Result<Option<FileId>, HistoryError>;
}

/// Everything annotate needs from the surrounding system.
pub trait History: ContentStore + RevisionGraph {}

impl<T: ContentStore + RevisionGraph> History for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_sha256_hex() {
        let id = FileId::for_content(b"");
        assert_eq!(
            id.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(FileId::for_content(b"x"), FileId::for_content(b"x"));
        assert_ne!(FileId::for_content(b"x"), FileId::for_content(b"y"));
    }

    #[test]
    fn test_revision_short() {
        let rev = RevisionId::new("0123456789abcdef");
        assert_eq!(rev.short(8), "01234567");
        assert_eq!(rev.short(64), "0123456789abcdef");
        assert_eq!(rev.to_string(), "0123456789abcdef");
    }
}
