//! Edit scripts from an ancestor to one descendant.

use std::fmt;

use tracing::trace;

use crate::text::interner::Token;
use crate::text::lcs::longest_common_subsequence;
use crate::text::walker::{HunkEvent, HunkWalker};

/// One entry of an edit script.
///
/// Positions are zero-based. The signed one-based encoding used on the wire
/// by older tools is available through [`Edit::signed`] and
/// [`Edit::from_signed`]: `-(i + 1)` deletes ancestor line `i`, `j + 1`
/// inserts descendant line `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Ancestor line at this index is not carried into the descendant.
    Delete(usize),
    /// Descendant line at this index has no ancestor counterpart.
    Insert(usize),
}

impl Edit {
    pub fn signed(self) -> i64 {
        match self {
            Self::Delete(a) => -(a as i64 + 1),
            Self::Insert(b) => b as i64 + 1,
        }
    }

    /// Decode a signed entry; zero is not a valid entry.
    pub fn from_signed(value: i64) -> Option<Self> {
        match value {
            v if v < 0 => Some(Self::Delete((-v - 1) as usize)),
            v if v > 0 => Some(Self::Insert((v - 1) as usize)),
            _ => None,
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.signed())
    }
}

/// Compute the edit script turning `ancestor` into `descendant`, in the
/// order the hunk walker emits it (deletions before insertions within a
/// hunk, trailing insertions before trailing deletions).
pub fn edit_script(ancestor: &[Token], descendant: &[Token]) -> Vec<Edit> {
    let lcs = longest_common_subsequence(ancestor, descendant);
    let edits: Vec<Edit> = HunkWalker::new(&lcs, ancestor, descendant)
        .filter_map(|event| match event {
            HunkEvent::DeleteAt(a) => Some(Edit::Delete(a)),
            HunkEvent::InsertAt(b) => Some(Edit::Insert(b)),
            HunkEvent::AdvanceTo(_) | HunkEvent::FlushHunk(_) => None,
        })
        .collect();
    trace!(
        ancestor = ancestor.len(),
        descendant = descendant.len(),
        edits = edits.len(),
        "edit script computed"
    );
    edits
}
