//! linehist core library.
//!
//! This crate provides line-oriented text history primitives: an interned
//! LCS diff with unified-diff output, an extent-based three-way merge, and a
//! revision-DAG-aware annotate. Storage and revision graphs are supplied by
//! the caller through the traits in [`history`].

pub mod annotate;
pub mod config;
pub mod errors;
pub mod history;
pub mod merge;
pub mod text;

// Re-exports for convenience.
pub use annotate::{annotate, annotate_path, AnnotateReport};
pub use config::{Config, MergeFallback};
pub use errors::CoreError;
pub use history::{FileId, History, MemoryHistory, RevisionId};
pub use merge::{merge3, MergeConflict, MergeOutcome, MergeProvider};
pub use text::{diff, UnifiedDiff};
