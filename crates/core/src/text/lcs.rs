//! Longest common subsequence over token sequences.
//!
//! The alignment comes from `similar`'s Myers diff (linear space); the
//! common subsequence is the run of `Equal` operations it reports.

use std::hash::Hash;

use similar::{capture_diff_slices, Algorithm, DiffOp};

/// Compute the longest common subsequence of `a` and `b`, in order.
pub fn longest_common_subsequence<T: Eq + Hash + Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    capture_diff_slices(Algorithm::Myers, a, b)
        .into_iter()
        .filter_map(|op| match op {
            DiffOp::Equal { old_index, len, .. } => Some(&a[old_index..old_index + len]),
            _ => None,
        })
        .flatten()
        .copied()
        .collect()
}
