//! Cursor: traversal over every entry with removal of the last-yielded
//! one.
//!
//! The cursor borrows its map mutably, so structural modification behind
//! its back is rejected at compile time. Removal eligibility is tracked
//! by an explicit state machine instead of a flag: `Positioned` is the
//! only state `remove` accepts, and it transitions to `Removed`, which
//! carries the precomputed successor so traversal resumes without
//! skipping or repeating an element.

use crate::bucket::EntryKey;
use crate::chained_hash_map::ChainedHashMap;
use core::fmt;

/// Failures reported by [`Cursor`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CursorError {
    /// `next` was called with no elements remaining.
    Exhausted,
    /// `remove` was called without an eligible preceding `next`.
    NotPositioned,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::Exhausted => f.write_str("cursor exhausted"),
            CursorError::NotPositioned => {
                f.write_str("cursor is not positioned on a removable entry")
            }
        }
    }
}

impl std::error::Error for CursorError {}

#[derive(Copy, Clone, Debug)]
enum State {
    /// No entry yielded yet.
    Fresh,
    /// Sitting on the last-yielded entry, which is removable.
    Positioned { bucket: usize, at: EntryKey },
    /// The last-yielded entry was removed; `next` resumes at the
    /// recorded successor.
    Removed {
        bucket: usize,
        next: Option<EntryKey>,
    },
    /// A failed `next` was observed; nothing is removable anymore.
    Exhausted,
}

/// Stateful traversal over a [`ChainedHashMap`], bucket index ascending
/// and front to back within each chain. One pass, non-restartable; a
/// fresh traversal needs a new cursor.
pub struct Cursor<'a, K, V, S> {
    map: &'a mut ChainedHashMap<K, V, S>,
    state: State,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut ChainedHashMap<K, V, S>) -> Self {
        Self {
            map,
            state: State::Fresh,
        }
    }

    /// Entry the cursor would yield next, leaving all state untouched.
    fn lookahead(&self) -> Option<(usize, EntryKey)> {
        match self.state {
            State::Fresh => self.map.first_occupied(0),
            State::Positioned { bucket, at } => match self.map.chain_next(at) {
                Some(k) => Some((bucket, k)),
                None => self.map.first_occupied(bucket + 1),
            },
            State::Removed { bucket, next } => match next {
                Some(k) => Some((bucket, k)),
                None => self.map.first_occupied(bucket + 1),
            },
            State::Exhausted => None,
        }
    }

    /// Whether another entry remains. Pure lookahead: repeated calls
    /// answer the same and never move the cursor.
    pub fn has_next(&self) -> bool {
        self.lookahead().is_some()
    }

    /// Advance to the next entry and yield its key and value. The
    /// yielded entry becomes eligible for [`remove`](Self::remove) until
    /// the cursor moves again. At the end of the table this fails with
    /// [`CursorError::Exhausted`] and the cursor stays exhausted.
    pub fn next(&mut self) -> Result<(&K, &mut V), CursorError> {
        match self.lookahead() {
            Some((bucket, at)) => {
                self.state = State::Positioned { bucket, at };
                Ok(self.map.entry_pair_mut(at))
            }
            None => {
                self.state = State::Exhausted;
                Err(CursorError::Exhausted)
            }
        }
    }

    /// Unlink the last-yielded entry from the map and return it. Fails
    /// with [`CursorError::NotPositioned`] before the first `next`,
    /// twice in a row, or after exhaustion; the map is untouched on
    /// failure.
    pub fn remove(&mut self) -> Result<(K, V), CursorError> {
        match self.state {
            State::Positioned { bucket, at } => {
                let next = self.map.chain_next(at);
                let removed = self.map.remove_at(bucket, at);
                self.state = State::Removed { bucket, next };
                Ok(removed)
            }
            _ => Err(CursorError::NotPositioned),
        }
    }
}

impl<K, V, S> fmt::Debug for Cursor<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("state", &self.state).finish()
    }
}
