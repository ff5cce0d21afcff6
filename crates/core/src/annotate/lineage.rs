//! Lineage mappings and the arena that owns them.
//!
//! A lineage mapping records, for each line of one file version, which lines
//! of the annotated file it became. Usually that is zero or one line; a
//! version reached along several child edges can carry a line into more
//! than one place. Work items refer to mappings by [`LineageId`].

use super::context::Evaluation;
use crate::text::interner::Token;
use crate::text::lcs::longest_common_subsequence;

/// Handle of a mapping stored in a [`LineageArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineageId(usize);

/// One file version's lines and where each ends up in the annotated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageMapping {
    tokens: Vec<Token>,
    mapping: Vec<Vec<usize>>,
}

impl LineageMapping {
    /// The annotated file itself: line `i` maps to line `i`.
    pub fn identity(tokens: Vec<Token>) -> Self {
        let mapping = (0..tokens.len()).map(|i| vec![i]).collect();
        Self { tokens, mapping }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn targets(&self, line: usize) -> &[usize] {
        &self.mapping[line]
    }

    /// Annotated-file lines reachable through this mapping.
    pub fn mapped_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.mapping.iter().flatten().copied()
    }

    /// Align this version against a parent's content and derive the
    /// parent's mapping.
    ///
    /// Lines on the common subsequence carry their targets over to the
    /// parent and are recorded as copied; every other mapped line is
    /// recorded as touched.
    pub fn derive_parent(&self, parent_tokens: Vec<Token>, step: &mut Evaluation) -> Self {
        let lcs = longest_common_subsequence(&self.tokens, &parent_tokens);
        let mut parent_mapping = vec![Vec::new(); parent_tokens.len()];

        let mut j = 0;
        let mut k = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            if k < lcs.len() && *token == lcs[k] {
                while parent_tokens[j] != lcs[k] {
                    j += 1;
                }
                for &target in &self.mapping[i] {
                    step.copy(target);
                }
                parent_mapping[j] = self.mapping[i].clone();
                j += 1;
                k += 1;
            } else {
                for &target in &self.mapping[i] {
                    step.touch(target);
                }
            }
        }
        assert_eq!(k, lcs.len(), "common subsequence not consumed by lineage walk");

        Self {
            tokens: parent_tokens,
            mapping: parent_mapping,
        }
    }

    /// Add every target of `other`, a mapping of the same file version.
    /// Returns how many targets were new.
    ///
    /// # Panics
    ///
    /// Panics if the two mappings describe different content.
    pub fn absorb(&mut self, other: &LineageMapping) -> usize {
        assert!(
            self.tokens == other.tokens,
            "cannot merge lineages of different file versions"
        );
        let mut added = 0;
        for (mine, theirs) in self.mapping.iter_mut().zip(&other.mapping) {
            for &target in theirs {
                if !mine.contains(&target) {
                    mine.push(target);
                    added += 1;
                }
            }
        }
        added
    }
}

/// Owns lineage mappings while work items still refer to them.
///
/// Each handle carries a count of outstanding holders; the mapping is
/// dropped when the last one releases it.
#[derive(Debug, Default)]
pub struct LineageArena {
    slots: Vec<Option<LineageMapping>>,
    holders: Vec<usize>,
}

impl LineageArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a mapping with one holder.
    pub fn insert(&mut self, mapping: LineageMapping) -> LineageId {
        self.slots.push(Some(mapping));
        self.holders.push(1);
        LineageId(self.slots.len() - 1)
    }

    pub fn retain(&mut self, id: LineageId) {
        self.check_live(id);
        self.holders[id.0] += 1;
    }

    pub fn release(&mut self, id: LineageId) {
        self.check_live(id);
        self.holders[id.0] -= 1;
        if self.holders[id.0] == 0 {
            self.slots[id.0] = None;
        }
    }

    pub fn get(&self, id: LineageId) -> &LineageMapping {
        match self.slots.get(id.0) {
            Some(Some(mapping)) => mapping,
            _ => panic!("lineage {} used after release", id.0),
        }
    }

    /// Give the caller's hold on `id` a mapping nobody else sees, copying it
    /// if it is shared, and return the handle to modify.
    pub fn make_unique(&mut self, id: LineageId) -> LineageId {
        self.check_live(id);
        if self.holders[id.0] == 1 {
            return id;
        }
        let copy = self.get(id).clone();
        self.release(id);
        self.insert(copy)
    }

    /// Mutable access to a mapping with a single holder.
    pub fn get_mut(&mut self, id: LineageId) -> &mut LineageMapping {
        assert_eq!(
            self.holders.get(id.0).copied(),
            Some(1),
            "lineage {} is shared or released",
            id.0
        );
        match self.slots.get_mut(id.0) {
            Some(Some(mapping)) => mapping,
            _ => panic!("lineage {} used after release", id.0),
        }
    }

    /// Mappings currently held.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn check_live(&self, id: LineageId) {
        assert!(
            id.0 < self.slots.len() && self.slots[id.0].is_some(),
            "lineage {} used after release",
            id.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::interner::Interner;

    fn tokens(interner: &mut Interner<char>, s: &str) -> Vec<Token> {
        interner.intern_all(s.chars())
    }

    #[test]
    fn test_derive_parent_worked_example() {
        // child = A B C D E F, parent = A z B C y
        let mut interner = Interner::new();
        let child = LineageMapping::identity(tokens(&mut interner, "ABCDEF"));
        let parent_tokens = tokens(&mut interner, "AzBCy");

        let mut step = Evaluation::new();
        let parent = child.derive_parent(parent_tokens, &mut step);

        let mapping: Vec<Vec<usize>> = (0..5).map(|i| parent.targets(i).to_vec()).collect();
        assert_eq!(mapping, vec![vec![0], vec![], vec![1], vec![2], vec![]]);
        assert_eq!(step.copied().iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(step.touched().iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_unmapped_lines_are_not_recorded() {
        let mut interner = Interner::new();
        let child = LineageMapping::identity(tokens(&mut interner, "ABC"));
        let mut step = Evaluation::new();
        let parent = child.derive_parent(tokens(&mut interner, "AzC"), &mut step);

        // The parent's "z" maps nowhere, so matching it records nothing.
        let mut step = Evaluation::new();
        let grandparent = parent.derive_parent(tokens(&mut interner, "qz"), &mut step);
        assert!(step.copied().is_empty());
        assert_eq!(step.touched().iter().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(grandparent.mapped_lines().count(), 0);
    }

    #[test]
    fn test_arena_releases_when_last_holder_leaves() {
        let mut interner = Interner::new();
        let mut arena = LineageArena::new();
        let id = arena.insert(LineageMapping::identity(tokens(&mut interner, "ab")));
        arena.retain(id);
        arena.release(id);
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.get(id).tokens().len(), 2);
        arena.release(id);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    #[should_panic(expected = "used after release")]
    fn test_arena_use_after_release_panics() {
        let mut arena = LineageArena::new();
        let id = arena.insert(LineageMapping::identity(Vec::new()));
        arena.release(id);
        arena.get(id);
    }

    #[test]
    fn test_absorb_unions_targets() {
        let mut interner = Interner::new();
        let child = LineageMapping::identity(tokens(&mut interner, "xqr"));
        let parent_tokens = tokens(&mut interner, "qrx");

        let mut step = Evaluation::new();
        let mut via_one = child.derive_parent(parent_tokens.clone(), &mut step);
        let shifted = LineageMapping::identity(tokens(&mut interner, "x"));
        let via_other = shifted.derive_parent(parent_tokens, &mut step);

        assert!(via_one.targets(2).is_empty());
        assert_eq!(via_one.absorb(&via_other), 1);
        assert_eq!(via_one.targets(2).to_vec(), vec![0]);
        assert_eq!(via_one.absorb(&via_other), 0);
        assert_eq!(via_one.mapped_lines().collect::<Vec<_>>(), vec![1, 2, 0]);
    }

    #[test]
    #[should_panic(expected = "different file versions")]
    fn test_absorb_rejects_other_content() {
        let mut interner = Interner::new();
        let mut a = LineageMapping::identity(tokens(&mut interner, "ab"));
        let b = LineageMapping::identity(tokens(&mut interner, "ba"));
        a.absorb(&b);
    }

    #[test]
    fn test_make_unique_copies_shared_mapping() {
        let mut interner = Interner::new();
        let mut arena = LineageArena::new();
        let id = arena.insert(LineageMapping::identity(tokens(&mut interner, "ab")));
        arena.retain(id);

        let own = arena.make_unique(id);
        assert_ne!(own, id);
        assert_eq!(arena.live(), 2);
        arena.get_mut(own).absorb(&LineageMapping::identity(tokens(&mut interner, "ab")));
        assert_eq!(arena.get(id).mapped_lines().count(), 2);

        assert_eq!(arena.make_unique(own), own);
    }
}
