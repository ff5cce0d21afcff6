//! Unified-diff hunks for display.
//!
//! The writer consumes [`HunkEvent`]s and groups edits into hunks with a
//! window of unchanged context lines around them. Two edits whose context
//! windows would touch end up in the same hunk.

use std::fmt;

use tracing::debug;

use super::interner::Interner;
use super::lcs::longest_common_subsequence;
use super::walker::{HunkEvent, HunkWalker};

/// One line of a hunk body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Context(Vec<u8>),
    Delete(Vec<u8>),
    Insert(Vec<u8>),
}

impl DiffLine {
    fn marker(&self) -> char {
        match self {
            Self::Context(_) => ' ',
            Self::Delete(_) => '-',
            Self::Insert(_) => '+',
        }
    }

    fn text(&self) -> &[u8] {
        match self {
            Self::Context(t) | Self::Delete(t) | Self::Insert(t) => t,
        }
    }
}

/// A contiguous group of edits with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Zero-based start of the hunk in the old file.
    pub old_start: usize,
    pub old_len: usize,
    /// Zero-based start of the hunk in the new file.
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
}

fn write_range(f: &mut fmt::Formatter<'_>, start: usize, len: usize) -> fmt::Result {
    match len {
        // An empty range names the line it follows.
        0 => write!(f, "{},0", start),
        1 => write!(f, "{}", start + 1),
        _ => write!(f, "{},{}", start + 1, len),
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -")?;
        write_range(f, self.old_start, self.old_len)?;
        write!(f, " +")?;
        write_range(f, self.new_start, self.new_len)?;
        writeln!(f, " @@")?;
        for line in &self.lines {
            writeln!(f, "{}{}", line.marker(), String::from_utf8_lossy(line.text()))?;
        }
        Ok(())
    }
}

/// A complete two-file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff {
    pub old_name: String,
    pub new_name: String,
    pub hunks: Vec<Hunk>,
}

impl UnifiedDiff {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}", self.old_name)?;
        writeln!(f, "+++ {}", self.new_name)?;
        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }
        Ok(())
    }
}

/// Groups walker events into [`Hunk`]s.
struct HunkWriter<'a, L> {
    a: &'a [L],
    b: &'a [L],
    context: usize,
    a_begin: usize,
    b_begin: usize,
    a_len: usize,
    b_len: usize,
    has_edits: bool,
    lines: Vec<DiffLine>,
    hunks: Vec<Hunk>,
}

impl<'a, L: AsRef<[u8]>> HunkWriter<'a, L> {
    fn new(a: &'a [L], b: &'a [L], context: usize) -> Self {
        Self {
            a,
            b,
            context,
            a_begin: 0,
            b_begin: 0,
            a_len: 0,
            b_len: 0,
            has_edits: false,
            lines: Vec::new(),
            hunks: Vec::new(),
        }
    }

    fn consume(&mut self, event: HunkEvent) {
        match event {
            HunkEvent::AdvanceTo(pos) => self.advance_to(pos),
            HunkEvent::DeleteAt(pos) => {
                self.lines.push(DiffLine::Delete(self.a[pos].as_ref().to_vec()));
                self.a_len += 1;
                self.has_edits = true;
            }
            HunkEvent::InsertAt(pos) => {
                self.lines.push(DiffLine::Insert(self.b[pos].as_ref().to_vec()));
                self.b_len += 1;
                self.has_edits = true;
            }
            HunkEvent::FlushHunk(pos) => self.flush_hunk(pos),
        }
    }

    fn push_context(&mut self, a_index: usize) {
        self.lines
            .push(DiffLine::Context(self.a[a_index].as_ref().to_vec()));
        self.a_len += 1;
        self.b_len += 1;
    }

    fn advance_to(&mut self, pos: usize) {
        let end = self.a_begin + self.a_len;
        let gap = if self.has_edits {
            2 * self.context
        } else {
            self.context
        };

        if end + gap < pos {
            self.flush_hunk(pos);
            let lead = self.context.min(pos);
            self.a_begin -= lead;
            self.b_begin -= lead;
            for index in pos - lead..pos {
                self.push_context(index);
            }
        } else {
            while self.a_begin + self.a_len < pos {
                self.push_context(self.a_begin + self.a_len);
            }
        }
    }

    fn flush_hunk(&mut self, pos: usize) {
        if self.has_edits {
            let trailing_from = self.a_begin + self.a_len;
            let trailing_to = (trailing_from + self.context).min(self.a.len());
            for index in trailing_from..trailing_to {
                self.push_context(index);
            }
            self.hunks.push(Hunk {
                old_start: self.a_begin,
                old_len: self.a_len,
                new_start: self.b_begin,
                new_len: self.b_len,
                lines: std::mem::take(&mut self.lines),
            });
        }

        let end = self.a_begin + self.a_len;
        self.b_begin = self.b_begin + self.b_len + pos.saturating_sub(end);
        self.a_begin = pos;
        self.a_len = 0;
        self.b_len = 0;
        self.has_edits = false;
        self.lines.clear();
    }
}

/// Diff two line sequences into unified-diff hunks with `context` lines of
/// surrounding context.
pub fn diff<L: AsRef<[u8]>>(
    old_name: &str,
    new_name: &str,
    old: &[L],
    new: &[L],
    context: usize,
) -> UnifiedDiff {
    let mut interner = Interner::new();
    let a = interner.intern_all(old.iter().map(|l| l.as_ref()));
    let b = interner.intern_all(new.iter().map(|l| l.as_ref()));
    let lcs = longest_common_subsequence(&a, &b);
    debug!(
        old_lines = a.len(),
        new_lines = b.len(),
        common = lcs.len(),
        "computed diff alignment"
    );

    let mut writer = HunkWriter::new(old, new, context);
    for event in HunkWalker::new(&lcs, &a, &b) {
        writer.consume(event);
    }

    UnifiedDiff {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
        hunks: writer.hunks,
    }
}
