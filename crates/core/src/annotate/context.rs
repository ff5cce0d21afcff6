//! Per-line attribution state of one annotate request.

use std::collections::BTreeSet;

use tracing::trace;

use super::report::{AnnotateReport, AnnotatedLine};
use crate::history::RevisionId;

/// Lines of the annotated file version and who each has been credited to.
///
/// A line moves from unassigned to assigned exactly once.
#[derive(Debug, Clone)]
pub struct AnnotateContext {
    lines: Vec<Vec<u8>>,
    annotations: Vec<Option<RevisionId>>,
    assigned: usize,
}

/// What one revision's parent edges said about the annotated lines.
///
/// Built fresh for every revision and consumed by
/// [`AnnotateContext::evaluate`].
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    copied: BTreeSet<usize>,
    touched: BTreeSet<usize>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The line survives unmodified into some parent.
    pub fn copy(&mut self, line: usize) {
        self.copied.insert(line);
    }

    /// The line has no counterpart in some parent.
    pub fn touch(&mut self, line: usize) {
        self.touched.insert(line);
    }

    pub fn copied(&self) -> &BTreeSet<usize> {
        &self.copied
    }

    pub fn touched(&self) -> &BTreeSet<usize> {
        &self.touched
    }

    /// Lines this revision introduced: touched on some edge and copied on
    /// none.
    pub fn credited(&self) -> impl Iterator<Item = usize> + '_ {
        self.touched.difference(&self.copied).copied()
    }
}

impl AnnotateContext {
    pub fn new(lines: Vec<Vec<u8>>) -> Self {
        let annotations = vec![None; lines.len()];
        Self {
            lines,
            annotations,
            assigned: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.assigned == self.lines.len()
    }

    pub fn unassigned(&self) -> usize {
        self.lines.len() - self.assigned
    }

    pub fn annotation(&self, line: usize) -> Option<&RevisionId> {
        self.check_index(line);
        self.annotations[line].as_ref()
    }

    /// Credit `revision` with every line the step touched but did not copy
    /// and that is still unassigned. Returns how many lines were credited.
    pub fn evaluate(&mut self, revision: &RevisionId, step: Evaluation) -> usize {
        let mut credited = 0;
        for line in step.credited() {
            self.check_index(line);
            if self.annotations[line].is_none() {
                trace!(line, revision = %revision, "line attributed");
                self.annotations[line] = Some(revision.clone());
                self.assigned += 1;
                credited += 1;
            }
        }
        credited
    }

    /// Consume the context into a report.
    pub fn finish(self) -> AnnotateReport {
        let complete = self.is_complete();
        let lines = self
            .lines
            .into_iter()
            .zip(self.annotations)
            .map(|(text, revision)| AnnotatedLine { text, revision })
            .collect();
        AnnotateReport::new(lines, complete)
    }

    fn check_index(&self, line: usize) {
        assert!(
            line < self.lines.len(),
            "line index {} out of range for file of {} lines",
            line,
            self.lines.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(n: usize) -> AnnotateContext {
        AnnotateContext::new((0..n).map(|i| format!("line {}", i).into_bytes()).collect())
    }

    #[test]
    fn test_credit_is_touched_minus_copied() {
        let mut ctx = context(4);
        let mut step = Evaluation::new();
        step.touch(0);
        step.touch(1);
        step.touch(2);
        step.copy(1);
        step.copy(3);

        let rev = RevisionId::new("r1");
        assert_eq!(ctx.evaluate(&rev, step), 2);
        assert_eq!(ctx.annotation(0), Some(&rev));
        assert_eq!(ctx.annotation(1), None);
        assert_eq!(ctx.annotation(2), Some(&rev));
        assert_eq!(ctx.unassigned(), 2);
    }

    #[test]
    fn test_assignment_is_final() {
        let mut ctx = context(1);
        let mut step = Evaluation::new();
        step.touch(0);
        ctx.evaluate(&RevisionId::new("first"), step.clone());
        assert_eq!(ctx.evaluate(&RevisionId::new("second"), step), 0);
        assert_eq!(ctx.annotation(0), Some(&RevisionId::new("first")));
        assert!(ctx.is_complete());
    }

    #[test]
    fn test_empty_file_is_complete() {
        let ctx = context(0);
        assert!(ctx.is_complete());
        assert!(ctx.finish().complete);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_line_panics() {
        let mut ctx = context(2);
        let mut step = Evaluation::new();
        step.touch(5);
        ctx.evaluate(&RevisionId::new("r"), step);
    }
}
