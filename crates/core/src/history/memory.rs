//! In-memory revision history.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ContentStore, FileChange, FileId, ParentEdge, RevisionGraph, RevisionId};
use crate::errors::HistoryError;

/// Descriptive metadata of a revision, used for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionInfo {
    pub author: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// A revision waiting to be added to a [`MemoryHistory`].
#[derive(Debug, Clone)]
pub struct NewRevision {
    id: RevisionId,
    parents: Vec<RevisionId>,
    files: Vec<(String, Vec<u8>)>,
    renames: Vec<Rename>,
    info: RevisionInfo,
}

#[derive(Debug, Clone)]
struct Rename {
    parent: RevisionId,
    from: String,
    to: String,
}

impl NewRevision {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RevisionId::new(id),
            parents: Vec::new(),
            files: Vec::new(),
            renames: Vec::new(),
            info: RevisionInfo::default(),
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(RevisionId::new(parent));
        self
    }

    pub fn file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Record that the file at `to` in this revision was at `from` in
    /// `parent`.
    pub fn rename(
        mut self,
        parent: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.renames.push(Rename {
            parent: RevisionId::new(parent),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.info.author = Some(author.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.info.date = Some(date);
        self
    }
}

#[derive(Debug, Clone)]
struct StoredRevision {
    parents: Vec<RevisionId>,
    files: BTreeMap<String, FileId>,
    /// (parent, child path) -> parent path
    renames: HashMap<(RevisionId, String), String>,
    info: RevisionInfo,
}

/// A complete revision DAG and content store held in memory.
///
/// Revisions must be added parents first, so the graph is acyclic by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    revisions: HashMap<RevisionId, StoredRevision>,
    order: Vec<RevisionId>,
    contents: HashMap<FileId, Vec<u8>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a revision and store its file contents.
    pub fn add_revision(&mut self, revision: NewRevision) -> Result<RevisionId, HistoryError> {
        let NewRevision {
            id,
            parents,
            files,
            renames,
            info,
        } = revision;

        if self.revisions.contains_key(&id) {
            return Err(HistoryError::DuplicateRevision(id.to_string()));
        }
        for parent in parents.iter().chain(renames.iter().map(|r| &r.parent)) {
            if !self.revisions.contains_key(parent) {
                return Err(HistoryError::UnknownParent {
                    revision: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        if let Some(rename) = renames.iter().find(|r| !parents.contains(&r.parent)) {
            return Err(HistoryError::UnknownParent {
                revision: id.to_string(),
                parent: rename.parent.to_string(),
            });
        }

        let mut stored_files = BTreeMap::new();
        for (path, content) in files {
            let file_id = FileId::for_content(&content);
            self.contents.entry(file_id.clone()).or_insert(content);
            stored_files.insert(path, file_id);
        }

        debug!(
            revision = %id,
            parents = parents.len(),
            files = stored_files.len(),
            "recorded revision"
        );
        self.revisions.insert(
            id.clone(),
            StoredRevision {
                parents,
                files: stored_files,
                renames: renames
                    .into_iter()
                    .map(|r| ((r.parent, r.to), r.from))
                    .collect(),
                info,
            },
        );
        self.order.push(id.clone());
        Ok(id)
    }

    pub fn revision_info(&self, revision: &RevisionId) -> Option<&RevisionInfo> {
        self.revisions.get(revision).map(|r| &r.info)
    }

    pub fn parents(&self, revision: &RevisionId) -> Option<&[RevisionId]> {
        self.revisions.get(revision).map(|r| r.parents.as_slice())
    }

    /// Revision ids in the order they were added.
    pub fn revisions(&self) -> impl Iterator<Item = &RevisionId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn get(&self, revision: &RevisionId) -> Result<&StoredRevision, HistoryError> {
        self.revisions
            .get(revision)
            .ok_or_else(|| HistoryError::RevisionNotFound(revision.to_string()))
    }
}

impl ContentStore for MemoryHistory {
    fn file_content(&self, file_id: &FileId) -> Result<Vec<u8>, HistoryError> {
        self.contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| HistoryError::FileNotFound(file_id.to_string()))
    }
}

impl RevisionGraph for MemoryHistory {
    fn parent_edges(
        &self,
        revision: &RevisionId,
        path: &str,
    ) -> Result<Vec<ParentEdge>, HistoryError> {
        let stored = self.get(revision)?;
        let file_id = stored
            .files
            .get(path)
            .ok_or_else(|| HistoryError::PathNotFound {
                revision: revision.to_string(),
                path: path.to_string(),
            })?;

        let mut edges = Vec::with_capacity(stored.parents.len());
        for parent in &stored.parents {
            let parent_path = stored
                .renames
                .get(&(parent.clone(), path.to_string()))
                .cloned()
                .unwrap_or_else(|| path.to_string());
            let change = match self.get(parent)?.files.get(&parent_path) {
                None => FileChange::Added,
                Some(parent_id) if parent_id == file_id => FileChange::Unchanged,
                Some(_) => FileChange::Modified,
            };
            edges.push(ParentEdge {
                parent: parent.clone(),
                parent_path,
                change,
            });
        }
        Ok(edges)
    }

    fn resolve_file_id(
        &self,
        revision: &RevisionId,
        path: &str,
    ) -> Result<Option<FileId>, HistoryError> {
        Ok(self.get(revision)?.files.get(path).cloned())
    }
}
