//! # Set Reconciler
//!
//! The one primitive every diff pass is built on: partition two name sets
//! into left-only, intersection, and right-only sequences. Used at each
//! nesting level — the global database set, the per-database retention-policy
//! sets, and the per-database continuous-query sets.

use itertools::Itertools;
use std::cmp::Ordering;

/// The three-way partition of two name sets.
///
/// All three sequences are strictly sorted and pairwise disjoint; their union
/// (as sets) equals the union of the two inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    /// Present on the left only (live but no longer desired).
    pub left_only: Vec<String>,
    /// Present on both sides.
    pub in_both: Vec<String>,
    /// Present on the right only (desired but not yet live).
    pub right_only: Vec<String>,
}

/// Partitions `left` and `right` via a single sorted merge.
///
/// Sorting both sides and walking them in lockstep keeps the output order
/// deterministic (lexicographic on the names) and avoids nested lookups.
pub fn reconcile<S: AsRef<str>>(left: &[S], right: &[S]) -> SetDiff {
    let left: Vec<&str> = left.iter().map(|s| s.as_ref()).sorted().dedup().collect();
    let right: Vec<&str> = right.iter().map(|s| s.as_ref()).sorted().dedup().collect();

    let mut diff = SetDiff::default();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(right[j]) {
            Ordering::Less => {
                diff.left_only.push(left[i].to_string());
                i += 1;
            }
            Ordering::Greater => {
                diff.right_only.push(right[j].to_string());
                j += 1;
            }
            Ordering::Equal => {
                diff.in_both.push(left[i].to_string());
                i += 1;
                j += 1;
            }
        }
    }
    diff.left_only
        .extend(left[i..].iter().map(|s| s.to_string()));
    diff.right_only
        .extend(right[j..].iter().map(|s| s.to_string()));
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_disjoint_sets() {
        let diff = reconcile(&names(&["a", "b"]), &names(&["c", "d"]));
        assert_eq!(diff.left_only, names(&["a", "b"]));
        assert!(diff.in_both.is_empty());
        assert_eq!(diff.right_only, names(&["c", "d"]));
    }

    #[test]
    fn test_overlapping_sets() {
        let diff = reconcile(&names(&["b", "a", "c"]), &names(&["c", "d", "b"]));
        assert_eq!(diff.left_only, names(&["a"]));
        assert_eq!(diff.in_both, names(&["b", "c"]));
        assert_eq!(diff.right_only, names(&["d"]));
    }

    #[test]
    fn test_identical_sets() {
        let diff = reconcile(&names(&["x", "y"]), &names(&["y", "x"]));
        assert!(diff.left_only.is_empty());
        assert_eq!(diff.in_both, names(&["x", "y"]));
        assert!(diff.right_only.is_empty());
    }

    #[test]
    fn test_empty_sides() {
        let empty: Vec<String> = vec![];
        let diff = reconcile(&empty, &names(&["a"]));
        assert_eq!(diff.right_only, names(&["a"]));
        let diff = reconcile(&names(&["a"]), &empty);
        assert_eq!(diff.left_only, names(&["a"]));
        let diff = reconcile(&empty, &empty);
        assert_eq!(diff, SetDiff::default());
    }

    #[test]
    fn test_outputs_sorted_and_partitioned() {
        let left = names(&["delta", "alpha", "echo", "bravo"]);
        let right = names(&["charlie", "echo", "alpha", "foxtrot"]);
        let diff = reconcile(&left, &right);

        for seq in [&diff.left_only, &diff.in_both, &diff.right_only] {
            let mut sorted = seq.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(seq, &sorted);
        }

        let mut union: Vec<String> = diff
            .left_only
            .iter()
            .chain(diff.in_both.iter())
            .chain(diff.right_only.iter())
            .cloned()
            .collect();
        union.sort();
        let mut expected: Vec<String> = left.iter().chain(right.iter()).cloned().collect();
        expected.sort();
        expected.dedup();
        assert_eq!(union, expected);
    }
}
