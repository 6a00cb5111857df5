//! chained-hashmap: a single-threaded hash map built on separate
//! chaining, with a removal-capable traversal cursor.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build ChainedHashMap in safe, verifiable layers so each piece
//!   can be reasoned about independently.
//! - Layers:
//!   - BucketArray<K, V>: structural layer. Every entry lives in a
//!     generational arena; buckets hold chain heads and `next` links are
//!     arena handles, so chains carry no owning pointers and the whole
//!     crate is free of `unsafe`. Knows nothing about hashing.
//!   - ChainedHashMap<K, V, S>: policy layer. Computes bucket indices,
//!     scans chains by key equality, drives load-factor growth, and
//!     includes a debug-only reentry check to keep internals consistent
//!     while probing runs user code.
//!   - Cursor<'_, K, V, S>: stateful traversal (bucket index ascending,
//!     chain front to back) that can remove the last-yielded entry
//!     without skipping or repeating its successor.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics).
//! - Unique keys; `put` on a present key overwrites in place and hands
//!   back the previous value.
//! - Lookups accept borrowed key forms via `Borrow<Q>`.
//! - Reentrancy: disallowed while a chain probe may run `K: Eq/Hash`;
//!   allowed once an operation's result has been handed out.
//!
//! Growth policy
//! - An insert that would push occupancy past `capacity * load_factor`
//!   re-buckets every entry into `ceil(capacity * growth_factor)` chains
//!   before the new entry is linked, so it lands in the new layout.
//!   Defaults: 5 buckets, load factor 0.75, growth factor 2.5.
//! - The replacement head array is allocated before any link changes;
//!   a half-migrated table is never observable.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash and re-bucketing always
//!   uses the stored hash; `K: Hash` is never invoked after insertion.
//!   This avoids rehash-time calls into user code.
//! - Bucket indices fold the hash by absolute value of its signed
//!   reinterpretation, with the one unrepresentable magnitude pinned to
//!   bucket 0. All operations share the single index function.
//!
//! Notes and non-goals
//! - Iteration order is unspecified for `iter`/`iter_mut`; the cursor's
//!   order is bucket index ascending, then chain order (newest first,
//!   since chains grow at the head).
//! - Removal never shrinks the bucket array.
//! - No null-key sentinel: the type system has no null, and a caller
//!   that wants an "absent" key uses `Option<T>` as the key type, which
//!   hashes like any other value.
//! - Public API surface is `ChainedHashMap`, its iterators, `Cursor`,
//!   and `CursorError`; the bucket layer is an implementation detail.

mod bucket;
mod chained_hash_map;
mod cursor;
mod guard;
mod map_proptest;

// Public surface
pub use chained_hash_map::{ChainedHashMap, Iter, IterMut};
pub use cursor::{Cursor, CursorError};
