//! Behavioural tests for the three-way merge.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use linehist_core::merge::{edit_script, merge3, ConflictSite, ExtentMap};
use linehist_core::text::{split_lines, Interner};

fn lines(text: &str) -> Vec<String> {
    split_lines(text.as_bytes())
        .into_iter()
        .map(|l| String::from_utf8_lossy(l).into_owned())
        .collect()
}

fn numbered(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| i.to_string()).collect()
}

/// Check `merge3` gives `expected` with the descendants in either order.
fn assert_merges_both_ways(ancestor: &[String], left: &[String], right: &[String], expected: &[String]) {
    assert_eq!(merge3(ancestor, left, right).unwrap(), expected, "left/right");
    assert_eq!(merge3(ancestor, right, left).unwrap(), expected, "right/left");
}

#[test]
fn test_merge_identity() {
    let samples = [
        vec![],
        lines("one\n"),
        lines("a\nb\nc\nb\na\n"),
        numbered(0..50),
    ];
    for x in samples {
        assert_eq!(merge3(&x, &x, &x).unwrap(), x);
    }
}

#[test]
fn test_independent_edits_at_both_ends() {
    let ancestor = lines("a\nb\nc\n");
    let left = lines("a\nb\nc\nx\n");
    let right = lines("y\na\nb\nc\n");
    assert_merges_both_ways(&ancestor, &left, &right, &lines("y\na\nb\nc\nx\n"));
}

#[test]
fn test_same_line_changed_differently_conflicts() {
    let err = merge3(&lines("a\n"), &lines("b\n"), &lines("c\n")).unwrap_err();
    assert_eq!(err.site, ConflictSite::Extent { ancestor_line: 0 });
}

#[test]
fn test_prepend() {
    let ancestor = numbered(0..10);
    let left = ancestor.clone();
    let right = numbered(10..20).into_iter().chain(numbered(0..10)).collect::<Vec<_>>();
    assert_merges_both_ways(&ancestor, &left, &right, &right);
}

#[test]
fn test_append() {
    let ancestor = numbered(0..10);
    let left = ancestor.clone();
    let right = numbered(0..20);
    assert_merges_both_ways(&ancestor, &left, &right, &right);
}

#[test]
fn test_additions() {
    let ancestor = lines("I like oatmeal\nI like orange juice\nI like toast");
    let desc1 = lines("I like oatmeal\nI don't like spam\nI like orange juice\nI like toast");
    let confl = lines("I like oatmeal\nI don't like tuna\nI like orange juice\nI like toast");
    let desc2 = lines("I like oatmeal\nI like orange juice\nI don't like tuna\nI like toast");
    let good = lines(
        "I like oatmeal\nI don't like spam\nI like orange juice\nI don't like tuna\nI like toast",
    );

    assert_merges_both_ways(&ancestor, &desc1, &desc2, &good);
    assert!(merge3(&ancestor, &desc1, &confl).is_err());
}

#[test]
fn test_deletions() {
    let ancestor = lines("I like oatmeal\nI like orange juice\nI like toast");
    let desc = lines("I like oatmeal\nI like toast");
    assert_merges_both_ways(&ancestor, &ancestor, &desc, &desc);
}

#[test]
fn test_both_sides_delete_and_edit_elsewhere() {
    let ancestor = numbered(0..6);
    let left: Vec<String> = ["0", "1", "3", "4", "5"].iter().map(|s| s.to_string()).collect();
    let right: Vec<String> = ["0", "1", "3", "4", "five"].iter().map(|s| s.to_string()).collect();
    let expected: Vec<String> = ["0", "1", "3", "4", "five"].iter().map(|s| s.to_string()).collect();
    assert_merges_both_ways(&ancestor, &left, &right, &expected);
}

// ---------------------------------------------------------------------------
// Randomized forks
// ---------------------------------------------------------------------------

struct Fork {
    ancestor: Vec<String>,
    left: Vec<String>,
    right: Vec<String>,
    merged: Vec<String>,
}

/// Build an ancestor of `hunks` ten-line blocks and two descendants where
/// each block is edited (insertions or deletions) on at most one side, plus
/// optional lines prepended or appended on one side. The expected merge
/// applies every edit.
fn random_fork(rng: &mut StdRng, hunks: usize) -> Fork {
    let mut fork = Fork {
        ancestor: Vec::new(),
        left: Vec::new(),
        right: Vec::new(),
        merged: Vec::new(),
    };

    let prepend = rng.gen_bool(0.5).then(|| rng.gen_bool(0.5));
    if let Some(on_left) = prepend {
        let block: Vec<String> = (0..10).map(|i| format!("prepend {}", i)).collect();
        if on_left {
            fork.left.extend(block.iter().cloned());
        } else {
            fork.right.extend(block.iter().cloned());
        }
        fork.merged.extend(block);
    }

    for h in 0..hunks {
        let original: Vec<String> = (0..10)
            .map(|i| format!("hunk {} -- initial {}", h, i))
            .collect();
        let mut edited = original.clone();
        if rng.gen_bool(0.5) {
            // Insert strictly between existing lines so edits never touch
            // the file boundaries.
            for i in 0..edited.len() / 2 {
                let at = rng.gen_range(1..edited.len());
                edited.insert(at, format!("hunk {} -- insert {}", h, i));
            }
        } else {
            for _ in 0..edited.len() / 2 {
                let at = rng.gen_range(0..edited.len() - 1);
                edited.remove(at);
            }
        }

        fork.ancestor.extend(original.iter().cloned());
        if rng.gen_bool(0.5) {
            fork.left.extend(edited.iter().cloned());
            fork.right.extend(original);
        } else {
            fork.left.extend(original);
            fork.right.extend(edited.iter().cloned());
        }
        fork.merged.extend(edited);
    }

    if rng.gen_bool(0.5) {
        let block: Vec<String> = (0..10).map(|i| format!("append {}", i)).collect();
        if rng.gen_bool(0.5) {
            fork.left.extend(block.iter().cloned());
        } else {
            fork.right.extend(block.iter().cloned());
        }
        fork.merged.extend(block);
    }

    fork
}

#[test]
fn test_randomized_forks_merge_cleanly() {
    let mut rng = StdRng::seed_from_u64(0x5eed_1dea);
    for i in 0..30 {
        let fork = random_fork(&mut rng, 10 + 2 * i);
        assert_eq!(
            merge3(&fork.ancestor, &fork.left, &fork.right).unwrap(),
            fork.merged,
            "fork {} left/right",
            i
        );
        assert_eq!(
            merge3(&fork.ancestor, &fork.right, &fork.left).unwrap(),
            fork.merged,
            "fork {} right/left",
            i
        );
    }
}

#[test]
fn test_extents_cover_random_descendants() {
    let mut rng = StdRng::seed_from_u64(7);
    let alphabet = ["a", "b", "c", "d"];
    for _ in 0..200 {
        let ancestor_len = rng.gen_range(0..12);
        let descendant_len = rng.gen_range(0..12);
        let ancestor: Vec<&str> = (0..ancestor_len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();
        let descendant: Vec<&str> = (0..descendant_len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();

        let mut interner = Interner::new();
        let a = interner.intern_all(ancestor.iter().copied());
        let d = interner.intern_all(descendant.iter().copied());
        let edits = edit_script(&a, &d);

        let mut map = ExtentMap::calculate(&edits, &d, a.len());
        assert_eq!(map.extents.len(), a.len());
        assert_eq!(map.reconstruct(&d), d, "{:?} -> {:?}", ancestor, descendant);

        map.normalize(&a, &d);
        assert_eq!(map.extents.len(), a.len());
        assert_eq!(map.reconstruct(&d), d, "normalized {:?} -> {:?}", ancestor, descendant);

        let once = map.clone();
        assert_eq!(map.normalize(&a, &d), 0);
        assert_eq!(map, once);
    }
}

fn random_lines(rng: &mut StdRng) -> Vec<&'static str> {
    const ALPHABET: [&str; 3] = ["x", "y", "z"];
    let len = rng.gen_range(0..8);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn test_merge_never_panics_on_random_triples() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        let ancestor = random_lines(&mut rng);
        let left = random_lines(&mut rng);
        let right = random_lines(&mut rng);
        if let Ok(merged) = merge3(&ancestor, &left, &right) {
            if left == ancestor {
                assert_eq!(merged, right);
            }
        }
    }
}
