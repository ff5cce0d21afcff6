//! Line-based three-way merge.

use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use super::edit_script::edit_script;
use super::extent::{Extent, ExtentKind, ExtentMap};
use crate::text::interner::{Interner, Token};

/// Where two descendants disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSite {
    /// Both sides inserted lines before the first ancestor line.
    Prefix,
    /// Both sides appended lines after the last ancestor line.
    Suffix,
    /// The two sides did incompatible things to this ancestor line.
    Extent { ancestor_line: usize },
}

impl fmt::Display for ConflictSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => write!(f, "start of file"),
            Self::Suffix => write!(f, "end of file"),
            Self::Extent { ancestor_line } => write!(f, "ancestor line {}", ancestor_line + 1),
        }
    }
}

/// The merge could not be completed automatically.
///
/// This is an expected outcome, not a failure: callers decide whether to
/// fall back to conflict markers or to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("merge conflict at {site}")]
pub struct MergeConflict {
    pub site: ConflictSite,
}

impl MergeConflict {
    fn at(site: ConflictSite) -> Self {
        Self { site }
    }
}

fn content<'a>(extent: &Extent, tokens: &'a [Token]) -> &'a [Token] {
    &tokens[extent.pos..extent.end()]
}

/// Combine two normalized extent maps taken against the same ancestor.
///
/// # Panics
///
/// Panics if the maps disagree on the ancestor length.
pub fn merge_extents(
    left: &ExtentMap,
    left_tokens: &[Token],
    right: &ExtentMap,
    right_tokens: &[Token],
) -> Result<Vec<Token>, MergeConflict> {
    assert_eq!(
        left.extents.len(),
        right.extents.len(),
        "extent maps must come from the same ancestor"
    );

    if !left.prefix.is_empty() && !right.prefix.is_empty() {
        debug!("both sides insert at the start of the file");
        return Err(MergeConflict::at(ConflictSite::Prefix));
    }
    if !left.suffix.is_empty() && !right.suffix.is_empty() {
        debug!("both sides append at the end of the file");
        return Err(MergeConflict::at(ConflictSite::Suffix));
    }

    let mut merged: Vec<Token> = Vec::with_capacity(left_tokens.len().max(right_tokens.len()));
    merged.extend_from_slice(if left.prefix.is_empty() {
        &right.prefix
    } else {
        &left.prefix
    });

    for (index, (l, r)) in left.extents.iter().zip(&right.extents).enumerate() {
        use ExtentKind::*;

        let conflict = || {
            debug!(ancestor_line = index, left = %l, right = %r, "conflicting extents");
            MergeConflict::at(ConflictSite::Extent {
                ancestor_line: index,
            })
        };

        match (l.kind, r.kind) {
            (Changed, Changed) | (Preserved, Preserved) => {
                let lc = content(l, left_tokens);
                if lc != content(r, right_tokens) {
                    return Err(conflict());
                }
                merged.extend_from_slice(lc);
            }
            (Deleted, Deleted) | (Deleted, Preserved) | (Preserved, Deleted) => {
                trace!(ancestor_line = index, "line dropped");
            }
            (Changed, Preserved) => merged.extend_from_slice(content(l, left_tokens)),
            (Preserved, Changed) => merged.extend_from_slice(content(r, right_tokens)),
            (Changed, Deleted) | (Deleted, Changed) => return Err(conflict()),
        }
    }

    merged.extend_from_slice(if left.suffix.is_empty() {
        &right.suffix
    } else {
        &left.suffix
    });
    Ok(merged)
}

/// Merge `left` and `right`, both derived from `ancestor`.
///
/// Lines are compared by equality; any `Hash + Eq` line type works. On
/// success the merged sequence is returned; a [`MergeConflict`] names the
/// first place the two sides could not be reconciled.
pub fn merge3<T: Hash + Eq + Clone>(
    ancestor: &[T],
    left: &[T],
    right: &[T],
) -> Result<Vec<T>, MergeConflict> {
    let mut interner = Interner::new();
    let a = interner.intern_all(ancestor.iter().cloned());
    let l = interner.intern_all(left.iter().cloned());
    let r = interner.intern_all(right.iter().cloned());

    let left_edits = edit_script(&a, &l);
    let right_edits = edit_script(&a, &r);
    debug!(
        ancestor = a.len(),
        left = l.len(),
        right = r.len(),
        left_edits = left_edits.len(),
        right_edits = right_edits.len(),
        "merging"
    );

    let mut left_map = ExtentMap::calculate(&left_edits, &l, a.len());
    let mut right_map = ExtentMap::calculate(&right_edits, &r, a.len());
    let rewrites = left_map.normalize(&a, &l) + right_map.normalize(&a, &r);
    trace!(rewrites, "extents normalized");

    let merged = merge_extents(&left_map, &l, &right_map, &r)?;
    Ok(merged
        .into_iter()
        .map(|token| interner.lookup(token).clone())
        .collect())
}
