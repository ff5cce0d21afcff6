//! Replaying an LCS alignment as hunk events.
//!
//! [`HunkWalker`] walks the two original sequences in lockstep against their
//! common subsequence. Wherever both sides agree with the next LCS token the
//! walk advances silently; otherwise it announces the position with
//! [`HunkEvent::AdvanceTo`], then emits deletions from `a` followed by
//! insertions from `b` until both sides are back on the LCS. The walk ends
//! with trailing insertions, trailing deletions and one
//! [`HunkEvent::FlushHunk`].

/// One step of an alignment replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkEvent {
    /// The next edits happen at this position in `a`; everything before it
    /// that has not been deleted is preserved.
    AdvanceTo(usize),
    /// Line `a[index]` is not part of the alignment.
    DeleteAt(usize),
    /// Line `b[index]` is not part of the alignment.
    InsertAt(usize),
    /// The walk is over; `a` was consumed up to this position.
    FlushHunk(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Matching,
    Deleting,
    Inserting,
    TailInsertStart,
    TailInsert,
    TailDeleteStart,
    TailDelete,
    DisjointDelete,
    DisjointInsert,
    Flush,
    Done,
}

/// Lazy, single-pass iterator of [`HunkEvent`]s for `lcs(a, b)`.
pub struct HunkWalker<'a, T> {
    lcs: &'a [T],
    a: &'a [T],
    b: &'a [T],
    a_pos: usize,
    b_pos: usize,
    lcs_pos: usize,
    phase: Phase,
    pending: Option<HunkEvent>,
}

impl<'a, T: Eq + Copy> HunkWalker<'a, T> {
    /// `lcs` must be a common subsequence of `a` and `b`; the walk panics
    /// if it cannot find an LCS token in either side.
    pub fn new(lcs: &'a [T], a: &'a [T], b: &'a [T]) -> Self {
        let (phase, pending) = if lcs.is_empty() {
            // Nothing in common: delete all of a, insert all of b.
            (Phase::DisjointDelete, Some(HunkEvent::AdvanceTo(0)))
        } else {
            (Phase::Matching, None)
        };
        Self {
            lcs,
            a,
            b,
            a_pos: 0,
            b_pos: 0,
            lcs_pos: 0,
            phase,
            pending,
        }
    }

    fn current_lcs(&self) -> T {
        self.lcs[self.lcs_pos]
    }

    fn a_at(&self, pos: usize) -> T {
        assert!(pos < self.a.len(), "LCS token missing from left sequence");
        self.a[pos]
    }

    fn b_at(&self, pos: usize) -> T {
        assert!(pos < self.b.len(), "LCS token missing from right sequence");
        self.b[pos]
    }
}

impl<'a, T: Eq + Copy> Iterator for HunkWalker<'a, T> {
    type Item = HunkEvent;

    fn next(&mut self) -> Option<HunkEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        loop {
            match self.phase {
                Phase::Matching => {
                    if self.lcs_pos == self.lcs.len() {
                        self.phase = Phase::TailInsertStart;
                        continue;
                    }
                    let token = self.current_lcs();
                    if self.a_at(self.a_pos) == token && self.b_at(self.b_pos) == token {
                        self.a_pos += 1;
                        self.b_pos += 1;
                        self.lcs_pos += 1;
                        continue;
                    }
                    self.phase = Phase::Deleting;
                    return Some(HunkEvent::AdvanceTo(self.a_pos));
                }
                Phase::Deleting => {
                    if self.a_at(self.a_pos) != self.current_lcs() {
                        self.a_pos += 1;
                        return Some(HunkEvent::DeleteAt(self.a_pos - 1));
                    }
                    self.phase = Phase::Inserting;
                }
                Phase::Inserting => {
                    if self.b_at(self.b_pos) != self.current_lcs() {
                        self.b_pos += 1;
                        return Some(HunkEvent::InsertAt(self.b_pos - 1));
                    }
                    // Both sides sit on the LCS token again; consume it.
                    self.a_pos += 1;
                    self.b_pos += 1;
                    self.lcs_pos += 1;
                    self.phase = Phase::Matching;
                }
                Phase::TailInsertStart => {
                    self.phase = Phase::TailDeleteStart;
                    if self.b_pos < self.b.len() {
                        self.phase = Phase::TailInsert;
                        return Some(HunkEvent::AdvanceTo(self.a_pos));
                    }
                }
                Phase::TailInsert => {
                    if self.b_pos < self.b.len() {
                        self.b_pos += 1;
                        return Some(HunkEvent::InsertAt(self.b_pos - 1));
                    }
                    self.phase = Phase::TailDeleteStart;
                }
                Phase::TailDeleteStart => {
                    self.phase = Phase::Flush;
                    if self.a_pos < self.a.len() {
                        self.phase = Phase::TailDelete;
                        return Some(HunkEvent::AdvanceTo(self.a_pos));
                    }
                }
                Phase::TailDelete | Phase::DisjointDelete => {
                    if self.a_pos < self.a.len() {
                        self.a_pos += 1;
                        return Some(HunkEvent::DeleteAt(self.a_pos - 1));
                    }
                    self.phase = if self.phase == Phase::DisjointDelete {
                        Phase::DisjointInsert
                    } else {
                        Phase::Flush
                    };
                }
                Phase::DisjointInsert => {
                    if self.b_pos < self.b.len() {
                        self.b_pos += 1;
                        return Some(HunkEvent::InsertAt(self.b_pos - 1));
                    }
                    self.phase = Phase::Flush;
                }
                Phase::Flush => {
                    self.phase = Phase::Done;
                    return Some(HunkEvent::FlushHunk(self.a_pos));
                }
                Phase::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::lcs::longest_common_subsequence;
    use HunkEvent::*;

    fn events(a: &str, b: &str) -> Vec<HunkEvent> {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let lcs = longest_common_subsequence(&a, &b);
        HunkWalker::new(&lcs, &a, &b).collect()
    }

    /// Apply the events to `a` and check that `b` comes out.
    fn replay(a: &str, b: &str) -> String {
        let av: Vec<char> = a.chars().collect();
        let bv: Vec<char> = b.chars().collect();
        let lcs = longest_common_subsequence(&av, &bv);
        let mut out = String::new();
        let mut a_pos = 0;
        for event in HunkWalker::new(&lcs, &av, &bv) {
            match event {
                AdvanceTo(pos) | FlushHunk(pos) => {
                    while a_pos < pos {
                        out.push(av[a_pos]);
                        a_pos += 1;
                    }
                }
                DeleteAt(pos) => {
                    assert_eq!(pos, a_pos);
                    a_pos += 1;
                }
                InsertAt(pos) => out.push(bv[pos]),
            }
        }
        while a_pos < av.len() {
            out.push(av[a_pos]);
            a_pos += 1;
        }
        out
    }

    #[test]
    fn test_identical_only_flushes() {
        assert_eq!(events("abc", "abc"), vec![FlushHunk(3)]);
    }

    #[test]
    fn test_disjoint_deletes_then_inserts() {
        assert_eq!(
            events("ab", "xyz"),
            vec![
                AdvanceTo(0),
                DeleteAt(0),
                DeleteAt(1),
                InsertAt(0),
                InsertAt(1),
                InsertAt(2),
                FlushHunk(2)
            ]
        );
    }

    #[test]
    fn test_replacement_in_middle() {
        assert_eq!(
            events("abc", "axc"),
            vec![AdvanceTo(1), DeleteAt(1), InsertAt(1), FlushHunk(3)]
        );
    }

    #[test]
    fn test_trailing_insert_then_delete() {
        assert_eq!(
            events("ab", "ac"),
            vec![AdvanceTo(1), InsertAt(1), AdvanceTo(1), DeleteAt(1), FlushHunk(2)]
        );
    }

    #[test]
    fn test_replay_reconstructs_target() {
        let cases = [
            ("", ""),
            ("", "abc"),
            ("abc", ""),
            ("abc", "abc"),
            ("abcdef", "azcdxf"),
            ("aaaa", "aba"),
            ("the quick brown fox", "a quick brown dog"),
            ("xyz", "zyx"),
        ];
        for (a, b) in cases {
            assert_eq!(replay(a, b), b, "replaying {:?} -> {:?}", a, b);
        }
    }
}
