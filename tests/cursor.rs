// Cursor test suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Coverage: a full traversal yields each live entry exactly once.
// - Eligibility: `remove` only succeeds on the entry the most recent
//   `next` yielded, and only once per yield.
// - Continuity: removing an entry neither skips nor repeats its
//   successor, including mid-chain under forced collisions.
// - Exhaustion: a failed `next` leaves the cursor exhausted; failures
//   never mutate the map.
use chained_hashmap::{ChainedHashMap, CursorError};
use core::hash::{BuildHasher, Hasher};
use std::collections::BTreeSet;

// Forces every key into one bucket so chains get long.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

fn sample_map() -> ChainedHashMap<String, i32> {
    let mut m = ChainedHashMap::new();
    for (k, v) in [("k1", 1), ("k2", 2), ("k3", 3)] {
        m.put(k.to_string(), v);
    }
    m
}

fn drain_keys(m: &mut ChainedHashMap<String, i32>) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = m.cursor();
    while cursor.has_next() {
        let (k, _v) = cursor.next().unwrap();
        out.push(k.clone());
    }
    out
}

// Test: remove before any next.
// Verifies: NotPositioned error; the map is untouched.
#[test]
fn remove_on_fresh_cursor_errors_and_mutates_nothing() {
    let mut m = sample_map();
    {
        let mut cursor = m.cursor();
        assert_eq!(cursor.remove(), Err(CursorError::NotPositioned));
    }
    assert_eq!(m.len(), 3);
    for k in ["k1", "k2", "k3"] {
        assert!(m.contains_key(k));
    }
}

// Test: full traversal coverage.
// Verifies: every key yielded exactly once; yield count equals len.
#[test]
fn full_traversal_yields_each_entry_exactly_once() {
    let mut m = sample_map();
    let yielded = drain_keys(&mut m);
    assert_eq!(yielded.len(), 3);
    let seen: BTreeSet<&str> = yielded.iter().map(String::as_str).collect();
    assert_eq!(seen, BTreeSet::from(["k1", "k2", "k3"]));
}

// Test: the canonical safe-removal scenario.
// Assumes: keys {k1, k2, k3} inserted in that order.
// Verifies: one next + one remove leaves len 2, the yielded key absent,
// and a fresh traversal yields exactly the two survivors once each.
#[test]
fn removing_first_yielded_entry_leaves_survivors_intact() {
    let mut m = sample_map();

    let first = {
        let mut cursor = m.cursor();
        let (k, _v) = cursor.next().unwrap();
        let first = k.clone();
        let (removed_key, _removed_value) = cursor.remove().unwrap();
        assert_eq!(removed_key, first);
        first
    };

    assert_eq!(m.len(), 2);
    assert!(!m.contains_key(first.as_str()));

    let survivors = drain_keys(&mut m);
    assert_eq!(survivors.len(), 2);
    let seen: BTreeSet<String> = survivors.into_iter().collect();
    assert!(!seen.contains(&first));
    assert_eq!(seen.len(), 2);
}

// Test: eligibility is consumed by remove.
// Verifies: a second remove without an intervening next errors.
#[test]
fn double_remove_errors() {
    let mut m = sample_map();
    let mut cursor = m.cursor();
    cursor.next().unwrap();
    assert!(cursor.remove().is_ok());
    assert_eq!(cursor.remove(), Err(CursorError::NotPositioned));
}

// Test: traversal continues correctly after a remove.
// Verifies: the successor of a removed entry is neither skipped nor
// repeated; the map ends with exactly the unremoved entries.
#[test]
fn traversal_after_remove_neither_skips_nor_repeats() {
    let mut m = sample_map();
    let mut yielded = Vec::new();
    {
        let mut cursor = m.cursor();
        let mut first = true;
        while cursor.has_next() {
            let (k, _v) = cursor.next().unwrap();
            yielded.push(k.clone());
            if first {
                cursor.remove().unwrap();
                first = false;
            }
        }
    }
    assert_eq!(yielded.len(), 3, "every entry is yielded despite the removal");
    let distinct: BTreeSet<&String> = yielded.iter().collect();
    assert_eq!(distinct.len(), 3, "no entry is yielded twice");
    assert_eq!(m.len(), 2);
}

// Test: mid-chain removal under forced collisions.
// Assumes: the constant hasher puts every entry in one chain.
// Verifies: removing an interior chain node mid-traversal keeps the
// remaining nodes visible exactly once.
#[test]
fn mid_chain_removal_with_colliding_keys() {
    let mut m: ChainedHashMap<String, i32, ConstBuildHasher> =
        ChainedHashMap::with_hasher(ConstBuildHasher);
    for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
        m.put((*k).to_string(), i as i32);
    }

    let mut yielded = Vec::new();
    let mut removed = None;
    {
        let mut cursor = m.cursor();
        let mut position = 0;
        while cursor.has_next() {
            let (k, _v) = cursor.next().unwrap();
            yielded.push(k.clone());
            // remove the second entry of the shared chain
            if position == 1 {
                removed = Some(cursor.remove().unwrap().0);
            }
            position += 1;
        }
    }

    let removed = removed.expect("an entry was removed");
    assert_eq!(yielded.len(), 4);
    let distinct: BTreeSet<&String> = yielded.iter().collect();
    assert_eq!(distinct.len(), 4);
    assert_eq!(m.len(), 3);
    assert!(!m.contains_key(removed.as_str()));
}

// Test: removing every entry through the cursor.
// Verifies: the map is empty afterwards and each removal returned once.
#[test]
fn purging_every_entry_empties_the_map() {
    let mut m = ChainedHashMap::new();
    for i in 0..20 {
        m.put(format!("k{i}"), i);
    }

    let mut removed = 0;
    {
        let mut cursor = m.cursor();
        while cursor.has_next() {
            cursor.next().unwrap();
            cursor.remove().unwrap();
            removed += 1;
        }
    }
    assert_eq!(removed, 20);
    assert!(m.is_empty());
}

// Test: has_next is a pure lookahead.
// Verifies: repeated calls neither advance the cursor nor change the
// answer, before and between yields.
#[test]
fn has_next_is_idempotent() {
    let mut m = sample_map();
    let mut cursor = m.cursor();

    for _ in 0..5 {
        assert!(cursor.has_next());
    }
    let mut yielded = 0;
    while cursor.has_next() {
        assert!(cursor.has_next());
        cursor.next().unwrap();
        yielded += 1;
    }
    assert_eq!(yielded, 3);
    for _ in 0..5 {
        assert!(!cursor.has_next());
    }
}

// Test: exhaustion behavior.
// Verifies: next on an empty map fails; a failed next leaves the cursor
// exhausted, where further next calls keep failing and remove is
// rejected.
#[test]
fn exhausted_cursor_keeps_failing() {
    let mut empty: ChainedHashMap<String, i32> = ChainedHashMap::new();
    {
        let mut cursor = empty.cursor();
        assert!(!cursor.has_next());
        assert_eq!(cursor.next().map(|_| ()), Err(CursorError::Exhausted));
    }

    let mut m = sample_map();
    let mut cursor = m.cursor();
    while cursor.has_next() {
        cursor.next().unwrap();
    }
    assert_eq!(cursor.next().map(|_| ()), Err(CursorError::Exhausted));
    assert_eq!(cursor.next().map(|_| ()), Err(CursorError::Exhausted));
    assert_eq!(cursor.remove(), Err(CursorError::NotPositioned));
}

// Test: removal eligibility survives a (pure) has_next observation.
// Verifies: the idiomatic while-has_next loop can remove the final
// yielded entry even though has_next already answered false.
#[test]
fn remove_after_final_yield_still_works() {
    let mut m = ChainedHashMap::new();
    m.put("only".to_string(), 1);

    {
        let mut cursor = m.cursor();
        cursor.next().unwrap();
        assert!(!cursor.has_next());
        assert!(cursor.remove().is_ok());
    }
    assert!(m.is_empty());
}

// Test: value mutation through the cursor.
// Verifies: `next` yields a mutable value slot; updates stick.
#[test]
fn cursor_value_mutation_is_visible_after_traversal() {
    let mut m = sample_map();
    {
        let mut cursor = m.cursor();
        while cursor.has_next() {
            let (_k, v) = cursor.next().unwrap();
            *v *= 10;
        }
    }
    assert_eq!(m.get("k1"), Some(&10));
    assert_eq!(m.get("k2"), Some(&20));
    assert_eq!(m.get("k3"), Some(&30));
}
