//! Three-way merging of line sequences.
//!
//! Each descendant is diffed against the common ancestor into an
//! [`edit_script`], the script is folded into one [`Extent`] per ancestor
//! line, the extents are normalized, and the two extent maps are merged
//! index by index.

pub mod edit_script;
pub mod extent;
pub mod provider;
pub mod three_way;

pub use edit_script::{edit_script, Edit};
pub use extent::{Extent, ExtentKind, ExtentMap};
pub use provider::{MergeOutcome, MergeProvider};
pub use three_way::{merge3, merge_extents, ConflictSite, MergeConflict};
