//! ChainedHashMap: hashing, occupancy and resize policy atop the bucket
//! array.

use crate::bucket::{BucketArray, Entry, EntryKey};
use crate::cursor::Cursor;
use crate::guard::ReentryCheck;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

pub(crate) const DEFAULT_CAPACITY: usize = 5;
pub(crate) const DEFAULT_LOAD_FACTOR: f64 = 0.75;
pub(crate) const DEFAULT_GROWTH_FACTOR: f64 = 2.5;

/// Bucket index for a stored hash under `capacity` buckets.
///
/// The hash is reinterpreted as signed and folded by absolute value.
/// `abs()` has no result for the minimum signed value; that hash is
/// pinned to bucket 0. Every operation and the rehasher derive indices
/// through this one function; a divergence would strand entries in
/// unreachable chains.
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    match (hash as i64).checked_abs() {
        Some(magnitude) => (magnitude as u64 % capacity as u64) as usize,
        None => 0,
    }
}

/// A hash map built on separate chaining.
///
/// Entries live in a generational arena; each bucket holds the head of a
/// singly-linked chain of arena handles. Unique keys, values mutable in
/// place. Growth is driven by a load factor: an insert that would push
/// occupancy past `capacity * load_factor` first re-buckets every entry
/// into `ceil(capacity * growth_factor)` buckets.
///
/// Single-threaded by design. Lookups accept any borrowed form of the
/// key (store `String`, query `&str`).
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    pub(crate) buckets: BucketArray<K, V>,
    load_factor: f64,
    growth_factor: f64,
    reentry: ReentryCheck,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Map with the default configuration: 5 buckets, load factor 0.75,
    /// growth factor 2.5.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Map with `capacity` initial buckets and default factors.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(capacity, DEFAULT_LOAD_FACTOR, DEFAULT_GROWTH_FACTOR)
    }

    /// Map with explicit capacity, load factor and growth factor.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, `load_factor` is not a positive
    /// finite number, or `growth_factor` is not a finite number
    /// greater than 1.
    pub fn with_config(capacity: usize, load_factor: f64, growth_factor: f64) -> Self {
        Self::with_config_and_hasher(capacity, load_factor, growth_factor, RandomState::new())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Map with the default configuration and a caller-supplied hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(
            DEFAULT_CAPACITY,
            DEFAULT_LOAD_FACTOR,
            DEFAULT_GROWTH_FACTOR,
            hasher,
        )
    }

    /// Fully explicit constructor; all others delegate here.
    ///
    /// # Panics
    ///
    /// Panics on a zero `capacity`, a non-positive or non-finite
    /// `load_factor`, or a `growth_factor` that is not finite and
    /// greater than 1.
    pub fn with_config_and_hasher(
        capacity: usize,
        load_factor: f64,
        growth_factor: f64,
        hasher: S,
    ) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        assert!(
            load_factor.is_finite() && load_factor > 0.0,
            "load factor must be a positive finite number"
        );
        assert!(
            growth_factor.is_finite() && growth_factor > 1.0,
            "growth factor must be finite and greater than 1"
        );
        Self {
            hasher,
            buckets: BucketArray::with_capacity(capacity),
            load_factor,
            growth_factor,
            reentry: ReentryCheck::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of buckets, distinct from [`len`](Self::len).
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Scan the chain at `bucket` for a key equal to `q`, returning the
    /// match and its predecessor in the chain. Stored hashes are compared
    /// before user `Eq` runs.
    fn find_in_bucket<Q>(
        &self,
        bucket: usize,
        hash: u64,
        q: &Q,
    ) -> Option<(Option<EntryKey>, EntryKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut prev = None;
        let mut cur = self.buckets.head(bucket);
        while let Some(k) = cur {
            let entry = self.buckets.entry(k);
            if entry.hash == hash && entry.key.borrow() == q {
                return Some((prev, k));
            }
            prev = Some(k);
            cur = entry.next;
        }
        None
    }

    /// Insert `value` under `key`, returning the previous value if the
    /// key was already present. An overwrite never changes occupancy and
    /// never triggers growth; a fresh insert that would cross the
    /// load-factor threshold grows the table first, so the new entry is
    /// linked into the post-growth layout.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (hash, hit) = {
            let _g = self.reentry.enter();
            let hash = self.make_hash(&key);
            let bucket = bucket_index(hash, self.buckets.capacity());
            (hash, self.find_in_bucket(bucket, hash, &key))
        };
        if let Some((_, found)) = hit {
            let slot = &mut self.buckets.entry_mut(found).value;
            return Some(mem::replace(slot, value));
        }
        self.insert_new(hash, key, value);
        None
    }

    /// Insert only when `key` is absent. Returns `None` on insert; when
    /// the key is already present the map is untouched and the caller's
    /// `value` is handed back.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<V> {
        let (hash, hit) = {
            let _g = self.reentry.enter();
            let hash = self.make_hash(&key);
            let bucket = bucket_index(hash, self.buckets.capacity());
            (hash, self.find_in_bucket(bucket, hash, &key))
        };
        if hit.is_some() {
            return Some(value);
        }
        self.insert_new(hash, key, value);
        None
    }

    fn insert_new(&mut self, hash: u64, key: K, value: V) {
        let projected = self.buckets.len() + 1;
        if projected as f64 > self.buckets.capacity() as f64 * self.load_factor {
            self.grow();
        }
        let bucket = bucket_index(hash, self.buckets.capacity());
        self.buckets.push_front(bucket, key, value, hash);
    }

    /// Re-bucket every entry into `ceil(capacity * growth_factor)`
    /// buckets. Entries are relinked via their stored hashes; no key or
    /// value moves and no user code runs.
    fn grow(&mut self) {
        let new_capacity = (self.buckets.capacity() as f64 * self.growth_factor).ceil() as usize;
        self.buckets
            .rebucket(new_capacity, |hash| bucket_index(hash, new_capacity));
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentry.enter();
        let hash = self.make_hash(q);
        let bucket = bucket_index(hash, self.buckets.capacity());
        let (_, found) = self.find_in_bucket(bucket, hash, q)?;
        Some(&self.buckets.entry(found).value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let found = {
            let _g = self.reentry.enter();
            let hash = self.make_hash(q);
            let bucket = bucket_index(hash, self.buckets.capacity());
            self.find_in_bucket(bucket, hash, q)
        };
        found.map(move |(_, k)| &mut self.buckets.entry_mut(k).value)
    }

    /// Membership test. Performs its own chain scan rather than
    /// inspecting `get`, so a stored value that is itself "empty" (for
    /// example `V = Option<T>`) cannot be confused with an absent key.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentry.enter();
        let hash = self.make_hash(q);
        let bucket = bucket_index(hash, self.buckets.capacity());
        self.find_in_bucket(bucket, hash, q).is_some()
    }

    /// Remove the entry for `q`, returning its value. Removal never
    /// shrinks the bucket array.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove the entry for `q`, returning the owned key and value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let found = {
            let _g = self.reentry.enter();
            let hash = self.make_hash(q);
            let bucket = bucket_index(hash, self.buckets.capacity());
            self.find_in_bucket(bucket, hash, q)
                .map(|(prev, k)| (bucket, prev, k))
        };
        let (bucket, prev, target) = found?;
        // The structure is consistent again before (K, V) reaches the
        // caller, so their Drop impls may reenter the map safely.
        let entry = self.buckets.unlink(bucket, prev, target);
        Some((entry.key, entry.value))
    }

    /// Lazy iterator over `(&K, &V)` in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.arena_iter(),
        }
    }

    /// Lazy iterator over `(&K, &mut V)` in unspecified order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.buckets.arena_iter_mut(),
        }
    }

    /// Traversal cursor supporting removal of the last-yielded entry.
    /// Visits buckets in ascending index order and each chain front to
    /// back. The cursor borrows the map mutably, so no other structural
    /// modification can happen while it is live.
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        Cursor::new(self)
    }
}

// Handle-level helpers for the cursor. These never run user code, so
// they skip the reentry check.
impl<K, V, S> ChainedHashMap<K, V, S> {
    pub(crate) fn first_occupied(&self, from: usize) -> Option<(usize, EntryKey)> {
        self.buckets.occupied_from(from)
    }

    pub(crate) fn chain_next(&self, key: EntryKey) -> Option<EntryKey> {
        self.buckets.entry(key).next
    }

    pub(crate) fn entry_pair_mut(&mut self, key: EntryKey) -> (&K, &mut V) {
        let entry = self.buckets.entry_mut(key);
        (&entry.key, &mut entry.value)
    }

    /// Unlink `target` from `bucket` by rescanning the chain for its
    /// predecessor. The handle is known-live: the cursor is positioned
    /// on it and holds the map exclusively.
    pub(crate) fn remove_at(&mut self, bucket: usize, target: EntryKey) -> (K, V) {
        let mut prev = None;
        let mut cur = self.buckets.head(bucket);
        while let Some(k) = cur {
            if k == target {
                let entry = self.buckets.unlink(bucket, prev, target);
                return (entry.key, entry.value);
            }
            prev = Some(k);
            cur = self.buckets.entry(k).next;
        }
        unreachable!("cursor entry is not linked in its bucket")
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.buckets.arena_iter().map(|(_, e)| (&e.key, &e.value)))
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ChainedHashMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

/// Iterator over immutable entries in `ChainedHashMap`.
pub struct Iter<'a, K, V> {
    inner: slotmap::basic::Iter<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (&e.key, &e.value))
    }
}

/// Iterator over mutable entries in `ChainedHashMap`.
pub struct IterMut<'a, K, V> {
    inner: slotmap::basic::IterMut<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (&e.key, &mut e.value))
    }
}
