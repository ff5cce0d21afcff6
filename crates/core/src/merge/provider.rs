//! File-level merge driver.
//!
//! Wraps [`merge3`] for whole file contents: fast paths for trivial merges,
//! line splitting, content addressing of the result, and an optional
//! fallback that renders conflict markers with `diffy` when the line merge
//! gives up.

use tracing::{debug, info};

use super::three_way::{merge3, MergeConflict};
use crate::config::MergeFallback;
use crate::history::FileId;
use crate::text::lines::{guess_binary, join_lines, split_lines};

/// Outcome of a file-level merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merged without conflicts.
    Clean { content: Vec<u8>, file_id: FileId },
    /// The line merge conflicted; `content` holds the fallback rendering
    /// with conflict markers for the user to resolve.
    Conflicted {
        content: Vec<u8>,
        conflict: MergeConflict,
    },
    /// The line merge conflicted and no fallback was configured.
    Conflict(MergeConflict),
    /// At least one side looks binary and the sides differ; binary content
    /// is never merged line by line.
    Binary,
}

impl MergeOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean { .. })
    }

    fn clean(content: &[u8]) -> Self {
        Self::Clean {
            file_id: FileId::for_content(content),
            content: content.to_vec(),
        }
    }
}

/// Merges whole files according to a [`MergeFallback`] policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeProvider {
    fallback: MergeFallback,
}

impl MergeProvider {
    pub fn new(fallback: MergeFallback) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> MergeFallback {
        self.fallback
    }

    /// Merge `left` and `right`, both descended from `ancestor`.
    pub fn try_merge(&self, ancestor: &[u8], left: &[u8], right: &[u8]) -> MergeOutcome {
        info!(
            ancestor_bytes = ancestor.len(),
            left_bytes = left.len(),
            right_bytes = right.len(),
            "performing three-way file merge"
        );

        if let Some(content) = trivial_merge(ancestor, left, right) {
            return MergeOutcome::clean(content);
        }

        if guess_binary(ancestor) || guess_binary(left) || guess_binary(right) {
            debug!("refusing to line-merge binary content");
            return MergeOutcome::Binary;
        }

        let ancestor_lines = split_lines(ancestor);
        let left_lines = split_lines(left);
        let right_lines = split_lines(right);

        match merge3(&ancestor_lines, &left_lines, &right_lines) {
            Ok(merged) => {
                debug!(lines = merged.len(), "clean line merge");
                MergeOutcome::clean(&join_lines(&merged))
            }
            Err(conflict) => match self.fallback {
                MergeFallback::None => {
                    debug!(%conflict, "merge conflict, no fallback configured");
                    MergeOutcome::Conflict(conflict)
                }
                MergeFallback::Markers => {
                    debug!(%conflict, "merge conflict, rendering conflict markers");
                    let content = match diffy::merge_bytes(ancestor, left, right) {
                        Ok(content) | Err(content) => content,
                    };
                    MergeOutcome::Conflicted { content, conflict }
                }
            },
        }
    }

    /// Quick check: would [`try_merge`](Self::try_merge) come back clean?
    pub fn can_auto_merge(ancestor: &[u8], left: &[u8], right: &[u8]) -> bool {
        if trivial_merge(ancestor, left, right).is_some() {
            return true;
        }
        if guess_binary(ancestor) || guess_binary(left) || guess_binary(right) {
            return false;
        }
        merge3(
            &split_lines(ancestor),
            &split_lines(left),
            &split_lines(right),
        )
        .is_ok()
    }
}

/// Merges that need no line alignment: identical sides, or one side that
/// left the ancestor alone.
fn trivial_merge<'a>(ancestor: &'a [u8], left: &'a [u8], right: &'a [u8]) -> Option<&'a [u8]> {
    if left == right {
        debug!("left == right, identical sides");
        return Some(left);
    }
    if left == ancestor {
        debug!("left == ancestor, right wins cleanly");
        return Some(right);
    }
    if right == ancestor {
        debug!("right == ancestor, left wins cleanly");
        return Some(left);
    }
    None
}
