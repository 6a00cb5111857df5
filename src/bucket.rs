//! BucketArray: arena-backed storage for chain entries.
//!
//! Structural layer only. The arena owns every entry; buckets are chain
//! heads and `next` links are generational handles into the arena, so
//! chains have no owning pointers and no `unsafe`. Callers decide which
//! bucket an entry belongs to; this layer never hashes and never runs
//! user code.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational handle to an entry in the chain arena.
    pub(crate) struct EntryKey;
}

/// A single chain node. `hash` is computed once at insertion and reused
/// for every re-bucketing, so `K: Hash` never runs after insert.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) next: Option<EntryKey>,
}

/// Fixed-length array of chain heads plus the arena owning the entries.
///
/// Invariant: every entry reachable from `heads[i]` was linked there by a
/// caller that derived `i` from the entry's stored hash under the current
/// capacity. Rebucketing restores this after the capacity changes.
#[derive(Debug)]
pub(crate) struct BucketArray<K, V> {
    heads: Vec<Option<EntryKey>>,
    arena: SlotMap<EntryKey, Entry<K, V>>,
}

impl<K, V> BucketArray<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heads: vec![None; capacity],
            arena: SlotMap::with_key(),
        }
    }

    /// Number of buckets, distinct from the entry count.
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub(crate) fn head(&self, bucket: usize) -> Option<EntryKey> {
        self.heads[bucket]
    }

    pub(crate) fn entry(&self, key: EntryKey) -> &Entry<K, V> {
        &self.arena[key]
    }

    pub(crate) fn entry_mut(&mut self, key: EntryKey) -> &mut Entry<K, V> {
        &mut self.arena[key]
    }

    /// Link a new entry at the head of `bucket`.
    pub(crate) fn push_front(&mut self, bucket: usize, key: K, value: V, hash: u64) -> EntryKey {
        let next = self.heads[bucket];
        let handle = self.arena.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.heads[bucket] = Some(handle);
        handle
    }

    /// Unlink `target` from `bucket` and take it out of the arena. `prev`
    /// is the target's predecessor in the chain, `None` when the target is
    /// the chain head.
    pub(crate) fn unlink(
        &mut self,
        bucket: usize,
        prev: Option<EntryKey>,
        target: EntryKey,
    ) -> Entry<K, V> {
        let successor = self.arena[target].next;
        match prev {
            Some(p) => self.arena[p].next = successor,
            None => {
                debug_assert_eq!(self.heads[bucket], Some(target));
                self.heads[bucket] = successor;
            }
        }
        self.arena.remove(target).unwrap()
    }

    /// First occupied bucket at or after `from`, with its chain head.
    pub(crate) fn occupied_from(&self, from: usize) -> Option<(usize, EntryKey)> {
        self.heads
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(i, head)| head.map(|k| (i, k)))
    }

    /// Relink every entry into a freshly sized head array. Entries are
    /// reused in place: only `next` links and the head array change. The
    /// allocation happens before any link is touched, so the swap is
    /// observed all-or-nothing.
    pub(crate) fn rebucket(&mut self, new_capacity: usize, index_of: impl Fn(u64) -> usize) {
        let mut heads = vec![None; new_capacity];
        for (key, entry) in self.arena.iter_mut() {
            let bucket = index_of(entry.hash);
            entry.next = heads[bucket];
            heads[bucket] = Some(key);
        }
        self.heads = heads;
    }

    pub(crate) fn arena_iter(&self) -> slotmap::basic::Iter<'_, EntryKey, Entry<K, V>> {
        self.arena.iter()
    }

    pub(crate) fn arena_iter_mut(&mut self) -> slotmap::basic::IterMut<'_, EntryKey, Entry<K, V>> {
        self.arena.iter_mut()
    }
}
