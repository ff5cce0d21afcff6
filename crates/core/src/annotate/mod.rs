//! Line-level attribution ("blame") over a revision DAG.
//!
//! Starting at the annotated file version, the driver walks parent edges
//! breadth first. At each revision every parent edge classifies the
//! annotated lines it can still see as copied (present in that parent) or
//! touched (absent from it); lines touched and never copied originate at
//! that revision. Lineage mappings carry line identity backwards through
//! edits and renames.

pub mod context;
pub mod driver;
pub mod lineage;
pub mod report;

pub use context::{AnnotateContext, Evaluation};
pub use driver::{annotate, annotate_path};
pub use lineage::{LineageArena, LineageId, LineageMapping};
pub use report::{AnnotateReport, AnnotatedLine};
