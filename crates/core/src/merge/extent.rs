//! Ancestor-aligned extents.
//!
//! An [`ExtentMap`] describes one descendant relative to the common ancestor:
//! exactly one [`Extent`] per ancestor line, saying whether that line was
//! preserved, deleted, or changed (replaced by and/or followed by descendant
//! lines). Lines inserted before the first or after the last ancestor line
//! have no ancestor position and are kept apart as the prefix and suffix.
//!
//! Two maps computed against the same ancestor line up index by index, which
//! is what the three-way merge walks.

use std::fmt;

use tracing::trace;

use super::edit_script::Edit;
use crate::text::interner::Token;

/// How one ancestor line fared in a descendant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentKind {
    Preserved,
    Deleted,
    Changed,
}

impl fmt::Display for ExtentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preserved => write!(f, "preserved"),
            Self::Deleted => write!(f, "deleted"),
            Self::Changed => write!(f, "changed"),
        }
    }
}

/// A run of descendant lines standing in for one ancestor line.
///
/// `pos` indexes the descendant. `Deleted` extents have `len == 0` and `pos`
/// is only a cut point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub pos: usize,
    pub len: usize,
    pub kind: ExtentKind,
}

impl Extent {
    fn preserved(pos: usize) -> Self {
        Self {
            pos,
            len: 1,
            kind: ExtentKind::Preserved,
        }
    }

    fn deleted(pos: usize) -> Self {
        Self {
            pos,
            len: 0,
            kind: ExtentKind::Deleted,
        }
    }

    /// Descendant index one past the end of this extent.
    pub fn end(&self) -> usize {
        self.pos + self.len
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}+{}]", self.kind, self.pos, self.len)
    }
}

/// Extents of one descendant against its ancestor, plus unaligned insertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtentMap {
    pub prefix: Vec<Token>,
    pub extents: Vec<Extent>,
    pub suffix: Vec<Token>,
}

impl ExtentMap {
    /// Build the extent map for `descendant` from its edit script against an
    /// ancestor of `ancestor_len` lines.
    ///
    /// # Panics
    ///
    /// Panics if the script does not describe `descendant`, which shows up
    /// as an extent count different from `ancestor_len`.
    pub fn calculate(edits: &[Edit], descendant: &[Token], ancestor_len: usize) -> Self {
        let mut map = ExtentMap {
            extents: Vec::with_capacity(ancestor_len),
            ..Default::default()
        };
        let mut a_pos = 0;
        let mut b_pos = 0;

        for edit in edits {
            match *edit {
                Edit::Delete(a_deleted) => {
                    while a_pos < a_deleted {
                        a_pos += 1;
                        map.extents.push(Extent::preserved(b_pos));
                        b_pos += 1;
                    }
                    a_pos += 1;
                    map.extents.push(Extent::deleted(b_pos));
                }
                Edit::Insert(b_inserted) => {
                    while b_pos < b_inserted {
                        a_pos += 1;
                        map.extents.push(Extent::preserved(b_pos));
                        b_pos += 1;
                    }
                    assert_eq!(b_pos, b_inserted, "edit script out of order");

                    let token = descendant[b_pos];
                    if map.extents.is_empty() {
                        map.prefix.push(token);
                    } else if a_pos == ancestor_len {
                        map.suffix.push(token);
                    } else if let Some(last) = map.extents.last_mut() {
                        last.kind = ExtentKind::Changed;
                        last.len += 1;
                    }
                    b_pos += 1;
                }
            }
        }

        while map.extents.len() < ancestor_len {
            map.extents.push(Extent::preserved(b_pos));
            b_pos += 1;
        }

        assert_eq!(
            map.extents.len(),
            ancestor_len,
            "extent count must equal ancestor length"
        );
        map
    }

    /// Rewrite the extents into canonical form, running both passes until
    /// neither applies. Returns the number of rewrites performed.
    pub fn normalize(&mut self, ancestor: &[Token], descendant: &[Token]) -> usize {
        let mut rewrites = 0;
        loop {
            let step = self.shift_changes_left(descendant)
                + self.compact_changed_runs(ancestor, descendant);
            if step == 0 {
                break;
            }
            rewrites += step;
        }
        rewrites
    }

    /// A preserved line equal to the last line of the following changed
    /// extent can be read as the start of that change instead; the change
    /// moves one ancestor line earlier and the duplicate becomes preserved.
    fn shift_changes_left(&mut self, descendant: &[Token]) -> usize {
        let extents = &mut self.extents;
        let mut rewrites = 0;

        for i in 1..extents.len() {
            let mut j = i;
            while j > 0 {
                let prev = extents[j - 1];
                let cur = extents[j];
                let applies = prev.kind == ExtentKind::Preserved
                    && cur.kind == ExtentKind::Changed
                    && prev.end() == cur.pos
                    && descendant[prev.pos] == descendant[cur.end() - 1];
                if !applies {
                    break;
                }

                trace!(preserved = %prev, changed = %cur, "exchanging preserved and changed extents");
                extents[j - 1] = Extent {
                    pos: prev.pos,
                    len: cur.len,
                    kind: ExtentKind::Changed,
                };
                extents[j] = Extent {
                    pos: prev.pos + cur.len,
                    len: 1,
                    kind: ExtentKind::Preserved,
                };
                rewrites += 1;
                j -= 1;
            }
        }
        rewrites
    }

    /// Pull all but the last line of a changed extent into an adjoining
    /// changed predecessor. The single line left behind is demoted to
    /// preserved when it reproduces the ancestor line.
    fn compact_changed_runs(&mut self, ancestor: &[Token], descendant: &[Token]) -> usize {
        let extents = &mut self.extents;
        let mut rewrites = 0;

        for i in 1..extents.len() {
            let mut j = i;
            while j > 0
                && extents[j].kind == ExtentKind::Changed
                && extents[j - 1].kind == ExtentKind::Changed
                && extents[j].len > 1
                && extents[j - 1].end() == extents[j].pos
            {
                let piece = extents[j].len - 1;
                extents[j].len = 1;
                extents[j].pos += piece;
                extents[j - 1].len += piece;

                if descendant[extents[j].pos] == ancestor[j] {
                    trace!(index = j, "demoting single-line change to preserved");
                    extents[j].kind = ExtentKind::Preserved;
                }
                rewrites += 1;
                j -= 1;
            }
        }
        rewrites
    }

    /// Lay the map back out as a token sequence: prefix, the content of every
    /// preserved and changed extent, suffix.
    pub fn reconstruct(&self, descendant: &[Token]) -> Vec<Token> {
        let mut out = self.prefix.clone();
        for extent in &self.extents {
            if extent.kind != ExtentKind::Deleted {
                out.extend_from_slice(&descendant[extent.pos..extent.end()]);
            }
        }
        out.extend_from_slice(&self.suffix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::edit_script::edit_script;
    use crate::text::interner::Interner;
    use ExtentKind::*;

    struct Case {
        ancestor: Vec<Token>,
        descendant: Vec<Token>,
        map: ExtentMap,
    }

    fn build(ancestor: &[&str], descendant: &[&str]) -> Case {
        let mut interner = Interner::new();
        let ancestor = interner.intern_all(ancestor.iter().copied());
        let descendant = interner.intern_all(descendant.iter().copied());
        let edits = edit_script(&ancestor, &descendant);
        let map = ExtentMap::calculate(&edits, &descendant, ancestor.len());
        Case {
            ancestor,
            descendant,
            map,
        }
    }

    fn kinds(map: &ExtentMap) -> Vec<ExtentKind> {
        map.extents.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_unchanged_is_all_preserved() {
        let case = build(&["a", "b", "c"], &["a", "b", "c"]);
        assert_eq!(kinds(&case.map), vec![Preserved; 3]);
        assert!(case.map.prefix.is_empty() && case.map.suffix.is_empty());
    }

    #[test]
    fn test_middle_insert_extends_previous_extent() {
        let case = build(&["a", "b", "c"], &["a", "x", "b", "c"]);
        assert_eq!(
            case.map.extents,
            vec![
                Extent { pos: 0, len: 2, kind: Changed },
                Extent { pos: 2, len: 1, kind: Preserved },
                Extent { pos: 3, len: 1, kind: Preserved },
            ]
        );
    }

    #[test]
    fn test_deletion_leaves_zero_length_extent() {
        let case = build(&["a", "b", "c"], &["a", "c"]);
        assert_eq!(kinds(&case.map), vec![Preserved, Deleted, Preserved]);
        assert_eq!(case.map.extents[1].len, 0);
    }

    #[test]
    fn test_replacement_becomes_changed() {
        let case = build(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(kinds(&case.map), vec![Preserved, Changed, Preserved]);
        assert_eq!(case.map.extents[1], Extent { pos: 1, len: 1, kind: Changed });
    }

    #[test]
    fn test_prefix_and_suffix() {
        let case = build(&["a", "b"], &["p", "q", "a", "b", "s"]);
        assert_eq!(case.map.prefix.len(), 2);
        assert_eq!(case.map.suffix.len(), 1);
        assert_eq!(kinds(&case.map), vec![Preserved, Preserved]);
    }

    #[test]
    fn test_empty_ancestor_is_all_prefix() {
        let case = build(&[], &["x", "y"]);
        assert!(case.map.extents.is_empty());
        assert_eq!(case.map.prefix, case.descendant);
    }

    #[test]
    fn test_reconstruct_covers_descendant() {
        let pairs: [(&[&str], &[&str]); 6] = [
            (&["a", "b", "c"], &["y", "a", "b", "c", "x"]),
            (&["a", "b"], &["c", "a"]),
            (&["a", "b", "c", "d"], &["b", "x", "y", "d", "d"]),
            (&["a"], &["b"]),
            (&["a", "a", "a"], &["a"]),
            (&["1", "2", "3", "4", "5"], &["1", "3", "2", "4", "6", "5", "7"]),
        ];
        for (ancestor, descendant) in pairs {
            let mut case = build(ancestor, descendant);
            assert_eq!(case.map.extents.len(), ancestor.len());
            assert_eq!(case.map.reconstruct(&case.descendant), case.descendant);
            case.map.normalize(&case.ancestor, &case.descendant);
            assert_eq!(case.map.extents.len(), ancestor.len());
            assert_eq!(case.map.reconstruct(&case.descendant), case.descendant);
        }
    }

    #[test]
    fn test_shift_moves_change_onto_duplicate() {
        // Inserting a second "a" after the first is ambiguous; the change
        // is attributed to the earlier line.
        let mut case = build(&["a", "b"], &["a", "a", "b"]);
        let mut expected = case.map.clone();
        expected.extents[0] = Extent { pos: 0, len: 2, kind: Changed };
        assert_eq!(case.map, expected);

        case.map.normalize(&case.ancestor, &case.descendant);
        assert_eq!(case.map, expected);
    }

    #[test]
    fn test_shift_rewrites_preserved_before_trailing_duplicate() {
        let mut interner = Interner::new();
        let ancestor = interner.intern_all(["a", "b", "c"]);
        let descendant = interner.intern_all(["a", "x", "a", "c"]);
        let mut map = ExtentMap {
            prefix: Vec::new(),
            extents: vec![
                Extent { pos: 0, len: 1, kind: Preserved },
                Extent { pos: 1, len: 2, kind: Changed },
                Extent { pos: 3, len: 1, kind: Preserved },
            ],
            suffix: Vec::new(),
        };

        let rewrites = map.normalize(&ancestor, &descendant);
        assert!(rewrites >= 1);
        assert_eq!(
            map.extents,
            vec![
                Extent { pos: 0, len: 2, kind: Changed },
                Extent { pos: 2, len: 1, kind: Preserved },
                Extent { pos: 3, len: 1, kind: Preserved },
            ]
        );
        assert_eq!(map.reconstruct(&descendant), descendant);
    }

    #[test]
    fn test_compaction_demotes_restored_line() {
        let mut interner = Interner::new();
        let ancestor = interner.intern_all(["a", "b", "c"]);
        let descendant = interner.intern_all(["x", "y", "b", "c"]);
        let mut map = ExtentMap {
            prefix: Vec::new(),
            extents: vec![
                Extent { pos: 0, len: 1, kind: Changed },
                Extent { pos: 1, len: 2, kind: Changed },
                Extent { pos: 3, len: 1, kind: Preserved },
            ],
            suffix: Vec::new(),
        };

        map.normalize(&ancestor, &descendant);
        assert_eq!(
            map.extents,
            vec![
                Extent { pos: 0, len: 2, kind: Changed },
                Extent { pos: 2, len: 1, kind: Preserved },
                Extent { pos: 3, len: 1, kind: Preserved },
            ]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let pairs: [(&[&str], &[&str]); 4] = [
            (&["a", "b", "c"], &["a", "x", "a", "c"]),
            (&["a", "b"], &["a", "a", "a", "b"]),
            (&["x", "y", "z"], &["x", "q", "x", "q", "z"]),
            (&["1", "2", "3", "4"], &["1", "9", "1", "9", "1", "4"]),
        ];
        for (ancestor, descendant) in pairs {
            let mut case = build(ancestor, descendant);
            case.map.normalize(&case.ancestor, &case.descendant);
            let once = case.map.clone();
            assert_eq!(case.map.normalize(&case.ancestor, &case.descendant), 0);
            assert_eq!(case.map, once);
        }
    }
}
