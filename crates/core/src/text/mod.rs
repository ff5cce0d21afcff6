//! Line-level text primitives shared by diff, merge and annotate.
//!
//! The pipeline is always the same:
//! 1. **Split** raw bytes into lines ([`lines`]).
//! 2. **Intern** every line into a dense [`Token`] ([`interner`]).
//! 3. **Align** two token sequences with their longest common subsequence ([`lcs`]).
//! 4. **Walk** the alignment as delete / insert events ([`walker`]) and feed
//!    them to a consumer such as the unified-diff writer ([`unified`]).

pub mod interner;
pub mod lcs;
pub mod lines;
pub mod unified;
pub mod walker;

pub use interner::{Interner, Token};
pub use lcs::longest_common_subsequence;
pub use lines::{guess_binary, join_lines, split_lines};
pub use unified::{diff, DiffLine, Hunk, UnifiedDiff};
pub use walker::{HunkEvent, HunkWalker};
