//! Breadth-first traversal that attributes lines to revisions.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info, trace, warn};

use super::context::{AnnotateContext, Evaluation};
use super::lineage::{LineageArena, LineageId, LineageMapping};
use super::report::AnnotateReport;
use crate::errors::{AnnotateError, HistoryError};
use crate::history::{FileChange, FileId, History, RevisionId};
use crate::text::interner::Interner;
use crate::text::lines::split_lines;

/// A revision waiting to be evaluated, with the path of the file there and
/// the mapping from that file's lines to the annotated file.
#[derive(Debug)]
struct WorkItem {
    revision: RevisionId,
    path: String,
    lineage: LineageId,
}

/// FIFO of revisions to visit.
///
/// Processing order is breadth-first: a line is credited to the first
/// revision along the shortest discovered path that introduces it. A
/// revision is admitted at most once; while it waits in the queue its work
/// item stays reachable so later edges can extend its lineage.
#[derive(Debug, Default)]
struct Frontier {
    queue: VecDeque<RevisionId>,
    pending: HashMap<RevisionId, WorkItem>,
    seen: HashSet<RevisionId>,
}

impl Frontier {
    /// Mark `revision` as seen. Returns false if it already was, in which
    /// case it must not be pushed.
    fn admit(&mut self, revision: &RevisionId) -> bool {
        self.seen.insert(revision.clone())
    }

    fn push(&mut self, item: WorkItem) {
        debug_assert!(self.seen.contains(&item.revision));
        self.queue.push_back(item.revision.clone());
        self.pending.insert(item.revision.clone(), item);
    }

    fn pop(&mut self) -> Option<WorkItem> {
        let revision = self.queue.pop_front()?;
        self.pending.remove(&revision)
    }

    /// The queued, not yet evaluated, work item for `revision`.
    fn pending_mut(&mut self, revision: &RevisionId) -> Option<&mut WorkItem> {
        self.pending.get_mut(revision)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// How a parent reached from the current revision gets its lineage.
enum ParentLineage {
    /// Same content as the child; share the child's mapping.
    Shared,
    Derived(LineageMapping),
}

/// State of one annotate request.
struct Annotator<'h, H: History + ?Sized> {
    history: &'h H,
    interner: Interner<Vec<u8>>,
    arena: LineageArena,
    frontier: Frontier,
    udoi_lines: usize,
}

impl<'h, H: History + ?Sized> Annotator<'h, H> {
    fn new(history: &'h H) -> Self {
        Self {
            history,
            interner: Interner::new(),
            arena: LineageArena::new(),
            frontier: Frontier::default(),
            udoi_lines: 0,
        }
    }

    fn load_lines(&self, file_id: &FileId) -> Result<Vec<Vec<u8>>, HistoryError> {
        let content = self.history.file_content(file_id)?;
        Ok(split_lines(&content).into_iter().map(<[u8]>::to_vec).collect())
    }

    fn run(
        mut self,
        file_id: &FileId,
        revision: &RevisionId,
        path: &str,
    ) -> Result<AnnotateReport, AnnotateError> {
        let lines = self.load_lines(file_id)?;
        let tokens = self.interner.intern_all(lines.iter().cloned());
        let mut context = AnnotateContext::new(lines);
        self.udoi_lines = context.len();

        let lineage = self.arena.insert(LineageMapping::identity(tokens));
        self.frontier.admit(revision);
        self.frontier.push(WorkItem {
            revision: revision.clone(),
            path: path.to_string(),
            lineage,
        });

        let mut visited = 0usize;
        while !context.is_complete() {
            let Some(item) = self.frontier.pop() else {
                break;
            };
            visited += 1;
            let step = self.visit(&item)?;
            let credited = context.evaluate(&item.revision, step);
            debug!(
                revision = %item.revision,
                path = %item.path,
                credited,
                remaining = context.unassigned(),
                queued = self.frontier.len(),
                "revision evaluated"
            );
            self.arena.release(item.lineage);
        }

        if context.is_complete() {
            info!(visited, lines = context.len(), "annotation complete");
        } else {
            warn!(
                revision = %revision,
                path,
                unassigned = context.unassigned(),
                "revision graph exhausted before every line was attributed"
            );
        }
        Ok(context.finish())
    }

    /// Evaluate one revision's parent edges and hand each parent its
    /// lineage.
    fn visit(&mut self, item: &WorkItem) -> Result<Evaluation, AnnotateError> {
        let edges = self.history.parent_edges(&item.revision, &item.path)?;
        let mut step = Evaluation::new();
        let mut reached: Vec<(RevisionId, String, ParentLineage)> = Vec::new();

        {
            let mapping = self.arena.get(item.lineage);

            if edges.iter().all(|e| e.change == FileChange::Added) {
                // Nothing further back: whatever is still unassigned starts here.
                trace!(revision = %item.revision, "file originates at this revision");
                for line in 0..self.udoi_lines {
                    step.touch(line);
                }
            }

            for edge in edges {
                match edge.change {
                    FileChange::Added => {
                        trace!(parent = %edge.parent, "file added on edge");
                    }
                    FileChange::Unchanged => {
                        for line in mapping.mapped_lines() {
                            step.copy(line);
                        }
                        reached.push((edge.parent, edge.parent_path, ParentLineage::Shared));
                    }
                    FileChange::Modified => {
                        let parent_id = self
                            .history
                            .resolve_file_id(&edge.parent, &edge.parent_path)?
                            .ok_or_else(|| AnnotateError::MalformedEdge {
                                revision: item.revision.to_string(),
                                parent: edge.parent.to_string(),
                                path: edge.parent_path.clone(),
                            })?;
                        let content = self.history.file_content(&parent_id)?;
                        let parent_tokens = self.interner.intern_all(
                            split_lines(&content).into_iter().map(<[u8]>::to_vec),
                        );
                        let derived = mapping.derive_parent(parent_tokens, &mut step);
                        reached.push((
                            edge.parent,
                            edge.parent_path,
                            ParentLineage::Derived(derived),
                        ));
                    }
                }
            }
        }

        for (parent, path, lineage) in reached {
            self.route(item, parent, path, lineage);
        }
        Ok(step)
    }

    /// Queue `parent` with its lineage, or fold the lineage into the work
    /// item already waiting for it. Parents that were already evaluated get
    /// nothing.
    fn route(
        &mut self,
        child: &WorkItem,
        parent: RevisionId,
        path: String,
        lineage: ParentLineage,
    ) {
        if self.frontier.admit(&parent) {
            let lineage = match lineage {
                ParentLineage::Shared => {
                    self.arena.retain(child.lineage);
                    child.lineage
                }
                ParentLineage::Derived(mapping) => self.arena.insert(mapping),
            };
            self.frontier.push(WorkItem {
                revision: parent,
                path,
                lineage,
            });
            return;
        }

        let Some(queued) = self.frontier.pending_mut(&parent) else {
            trace!(parent = %parent, "parent already evaluated");
            return;
        };
        if queued.path != path {
            debug!(
                parent = %parent,
                queued_path = %queued.path,
                path = %path,
                "parent queued under another path, lineage not merged"
            );
            return;
        }

        let incoming = match lineage {
            ParentLineage::Shared => self.arena.get(child.lineage).clone(),
            ParentLineage::Derived(mapping) => mapping,
        };
        queued.lineage = self.arena.make_unique(queued.lineage);
        let added = self.arena.get_mut(queued.lineage).absorb(&incoming);
        trace!(parent = %parent, added, "merged lineage into queued parent");
    }
}

/// Attribute every line of `file_id`, the version of `path` at `revision`,
/// to the revision that introduced it.
pub fn annotate<H: History + ?Sized>(
    history: &H,
    file_id: &FileId,
    revision: &RevisionId,
    path: &str,
) -> Result<AnnotateReport, AnnotateError> {
    info!(revision = %revision, path, file_id = %file_id, "annotating file");
    Annotator::new(history).run(file_id, revision, path)
}

/// [`annotate`] the file at `path` as of `revision`.
pub fn annotate_path<H: History + ?Sized>(
    history: &H,
    revision: &RevisionId,
    path: &str,
) -> Result<AnnotateReport, AnnotateError> {
    let file_id = history
        .resolve_file_id(revision, path)?
        .ok_or_else(|| HistoryError::PathNotFound {
            revision: revision.to_string(),
            path: path.to_string(),
        })?;
    annotate(history, &file_id, revision, path)
}
