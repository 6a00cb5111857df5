#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can
// assert on capacity and cursor behavior without feature gates.

use crate::ChainedHashMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutIfAbsent(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Sweep,
    Purge(i32),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutIfAbsent(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Sweep),
            (2i32..=4).prop_map(OpI::Purge),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the model's previous value; overwrites keep `len`.
// - `put_if_absent` inserts exactly when the model has no entry and
//   hands the value back otherwise.
// - `get`/`get_mut`/`contains_key`/`remove` parity with the model,
//   including misses and borrowed-`str` queries.
// - Cursor sweeps see each live key exactly once; cursor purges remove
//   exactly the entries the model's `retain` removes.
// - `len`/`is_empty` parity after every operation, across any number of
//   growth rounds (tiny initial capacity forces them).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32> = ChainedHashMap::with_config(2, 0.75, 2.5);
        let mut model: HashMap<Key, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = key_from(&pool, i);
                    prop_assert_eq!(sut.put(k.clone(), v), model.insert(k, v));
                }
                OpI::PutIfAbsent(i, v) => {
                    let k = key_from(&pool, i);
                    let present = model.contains_key(&k);
                    match sut.put_if_absent(k.clone(), v) {
                        Some(rejected) => {
                            prop_assert!(present, "value handed back only when key exists");
                            prop_assert_eq!(rejected, v);
                        }
                        None => {
                            prop_assert!(!present, "insert only when key is absent");
                            model.insert(k, v);
                        }
                    }
                }
                OpI::Remove(i) => {
                    let k = key_from(&pool, i);
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                }
                OpI::Get(i) => {
                    let k = key_from(&pool, i);
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(
                        sut.contains_key(s.as_str()),
                        model.contains_key(s.as_str())
                    );
                }
                OpI::Mutate(i, d) => {
                    let k = key_from(&pool, i);
                    match (sut.get_mut(&k), model.get_mut(&k)) {
                        (Some(a), Some(b)) => {
                            *a = a.wrapping_add(d);
                            *b = b.wrapping_add(d);
                        }
                        (None, None) => {}
                        (a, b) => {
                            prop_assert!(false, "presence mismatch: sut={:?} model={:?}", a, b);
                        }
                    }
                }
                OpI::Sweep => {
                    let mut seen = BTreeSet::new();
                    let mut cursor = sut.cursor();
                    while cursor.has_next() {
                        let (k, _v) = cursor.next().unwrap();
                        prop_assert!(seen.insert(k.clone()), "key yielded twice: {:?}", k);
                    }
                    let expected: BTreeSet<Key> = model.keys().cloned().collect();
                    prop_assert_eq!(seen, expected);
                }
                OpI::Purge(m) => {
                    let mut cursor = sut.cursor();
                    while cursor.has_next() {
                        let doomed = {
                            let (_k, v) = cursor.next().unwrap();
                            v.rem_euclid(m) == 0
                        };
                        if doomed {
                            cursor.remove().unwrap();
                        }
                    }
                    model.retain(|_, v| v.rem_euclid(m) != 0);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: growth transparency. Whatever the configuration, crossing
// any number of load-factor thresholds loses no entry.
proptest! {
    #[test]
    fn prop_growth_preserves_entries(
        n in 1usize..200,
        capacity in 1usize..8,
        load_factor in 0.3f64..1.5,
        growth_factor in 1.3f64..4.0,
    ) {
        let mut m: ChainedHashMap<String, usize> =
            ChainedHashMap::with_config(capacity, load_factor, growth_factor);
        for i in 0..n {
            prop_assert_eq!(m.put(format!("k{i}"), i), None);
        }
        prop_assert_eq!(m.len(), n);
        for i in 0..n {
            prop_assert_eq!(m.get(format!("k{i}").as_str()), Some(&i));
        }
        // Growth fires at most once per insert, so capacity only moves up.
        prop_assert!(m.capacity() >= capacity);
    }
}
