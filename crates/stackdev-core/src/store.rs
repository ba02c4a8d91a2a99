//! Bounded LIFO word store
//!
//! The store is a movable capacity bound over a vector of the occupied words.
//! Index 0 is the bottom (oldest word), `len - 1` is the top (newest word).
//! Memory is only taken for words actually pushed, so the capacity can be
//! set to any value without allocating.
//!
//! Shrinking below the occupancy lowers the bound and cuts the vector: the
//! surviving words already sit at the low indices, so nothing is relocated.

use alloc::vec::Vec;

use crate::error::StackError;
use crate::types::{StackMetrics, StackSnapshot, Word, DEFAULT_CAPACITY};

/// Fixed-capacity LIFO buffer of [`Word`]s.
#[derive(Clone, Debug)]
pub struct StackStore {
    /// Occupied words, bottom first
    words: Vec<Word>,
    /// Maximum number of words allowed
    capacity: usize,
    /// Activity counters
    metrics: StackMetrics,
}

impl StackStore {
    /// Create an empty store with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store holding at most `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::new(),
            capacity,
            metrics: StackMetrics::default(),
        }
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Maximum number of words currently allowed.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of words currently held.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the store holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether the store has no free slot.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Free slots left before the store is full.
    pub fn room(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// The top word without removing it.
    pub fn peek(&self) -> Option<Word> {
        self.words.last().copied()
    }

    /// Occupied words, bottom first.
    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    /// Activity counters.
    pub fn metrics(&self) -> &StackMetrics {
        &self.metrics
    }

    /// Copy out the capacity and the occupied words.
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            capacity: self.capacity,
            words: self.words.clone(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Push one word on top.
    ///
    /// Refused with [`StackError::Full`] when `len == capacity`.
    pub fn push(&mut self, word: Word) -> Result<(), StackError> {
        self.push_many(&[word]).map(|_| ())
    }

    /// Push words in input order until the input or the room runs out.
    ///
    /// Returns how many words were pushed, which may be fewer than
    /// `words.len()`. Fails with [`StackError::Full`] only if the store had
    /// no room before the call and there was something to push, and with
    /// [`StackError::OutOfMemory`] if the words cannot be stored; both leave
    /// the store unchanged.
    pub fn push_many(&mut self, words: &[Word]) -> Result<usize, StackError> {
        if words.is_empty() {
            return Ok(0);
        }
        if self.is_full() {
            self.metrics.refused_pushes += 1;
            return Err(StackError::Full);
        }

        let count = words.len().min(self.room());
        self.words
            .try_reserve(count)
            .map_err(|_| StackError::OutOfMemory)?;
        self.words.extend_from_slice(&words[..count]);
        self.metrics.pushed += count as u64;
        self.metrics.high_water = self.metrics.high_water.max(self.len());
        Ok(count)
    }

    /// Remove and return the top word.
    ///
    /// Refused with [`StackError::Empty`] when the store holds nothing.
    pub fn pop(&mut self) -> Result<Word, StackError> {
        match self.words.pop() {
            Some(word) => {
                self.metrics.popped += 1;
                Ok(word)
            }
            None => {
                self.metrics.refused_pops += 1;
                Err(StackError::Empty)
            }
        }
    }

    /// Pop up to `max_count` words, top first.
    ///
    /// Returning fewer than `max_count` words is a success. Fails with
    /// [`StackError::Empty`] only if the store held nothing before the call.
    pub fn pop_many(&mut self, max_count: usize) -> Result<Vec<Word>, StackError> {
        if self.is_empty() {
            self.metrics.refused_pops += 1;
            return Err(StackError::Empty);
        }

        let start = self.len() - max_count.min(self.len());
        let popped: Vec<Word> = self.words.drain(start..).rev().collect();
        self.metrics.popped += popped.len() as u64;
        Ok(popped)
    }

    /// Change the capacity. Always succeeds.
    ///
    /// Shrinking below the occupancy discards words from the top until
    /// `len == new_capacity`; the older words keep their positions.
    /// Growing only moves the bound. Returns the number of words discarded.
    pub fn resize(&mut self, new_capacity: usize) -> usize {
        let truncated = self.len().saturating_sub(new_capacity);
        self.words.truncate(new_capacity);
        self.capacity = new_capacity;
        self.metrics.truncated += truncated as u64;
        truncated
    }

    /// Build a store from raw parts, bypassing every check.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(words: Vec<Word>, capacity: usize, metrics: StackMetrics) -> Self {
        Self {
            words,
            capacity,
            metrics,
        }
    }
}

impl Default for StackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::check_all_invariants;
    use alloc::vec;

    fn filled(capacity: usize, words: &[Word]) -> StackStore {
        let mut store = StackStore::with_capacity(capacity);
        assert_eq!(store.push_many(words).unwrap(), words.len());
        store
    }

    #[test]
    fn test_new_store_uses_default_capacity() {
        let store = StackStore::new();
        assert_eq!(store.capacity(), DEFAULT_CAPACITY);
        assert!(store.is_empty());
        assert_eq!(store.room(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_push_pop_is_lifo() {
        let mut store = StackStore::new();
        for w in 1..=5 {
            store.push(w).unwrap();
        }
        assert_eq!(store.peek(), Some(5));
        for expected in (1..=5).rev() {
            assert_eq!(store.pop().unwrap(), expected);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_push_on_full_store_is_refused() {
        let mut store = filled(2, &[1, 2]);
        assert_eq!(store.push(3), Err(StackError::Full));
        assert_eq!(store.as_slice(), &[1, 2]);
        assert_eq!(store.metrics().refused_pushes, 1);
    }

    #[test]
    fn test_pop_on_empty_store_is_refused() {
        let mut store = StackStore::new();
        assert_eq!(store.pop(), Err(StackError::Empty));
        assert_eq!(store.metrics().refused_pops, 1);
    }

    #[test]
    fn test_push_many_is_partial_when_room_runs_out() {
        let mut store = StackStore::with_capacity(3);
        let words: Vec<Word> = (1..=9).collect();
        assert_eq!(store.push_many(&words).unwrap(), 3);
        assert_eq!(store.as_slice(), &[1, 2, 3]);
        assert!(store.is_full());
    }

    #[test]
    fn test_push_many_fails_only_when_already_full() {
        let mut store = filled(2, &[1]);
        assert_eq!(store.push_many(&[2, 3]).unwrap(), 1);
        assert_eq!(store.push_many(&[4]), Err(StackError::Full));
        assert_eq!(store.push_many(&[]).unwrap(), 0);
    }

    #[test]
    fn test_pop_many_returns_top_first() {
        let mut store = filled(10, &[1, 2, 3, 4]);
        assert_eq!(store.pop_many(2).unwrap(), vec![4, 3]);
        assert_eq!(store.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_pop_many_is_partial_when_words_run_out() {
        let mut store = filled(10, &[1, 2, 3]);
        assert_eq!(store.pop_many(30).unwrap(), vec![3, 2, 1]);
        assert!(store.is_empty());
        assert_eq!(store.pop_many(1), Err(StackError::Empty));
    }

    #[test]
    fn test_pop_many_zero_on_non_empty_store() {
        let mut store = filled(4, &[1]);
        assert!(store.pop_many(0).unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_shrink_discards_newest_words() {
        let mut store = filled(10, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(store.resize(5), 3);
        assert_eq!(store.capacity(), 5);
        assert_eq!(store.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(store.pop_many(10).unwrap(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_shrink_above_occupancy_keeps_everything() {
        let mut store = filled(10, &[1, 2]);
        assert_eq!(store.resize(2), 0);
        assert_eq!(store.as_slice(), &[1, 2]);
        assert!(store.is_full());
    }

    #[test]
    fn test_grow_is_lossless() {
        let mut store = filled(3, &[7, 8, 9]);
        assert_eq!(store.resize(100), 0);
        assert_eq!(store.capacity(), 100);
        assert_eq!(store.as_slice(), &[7, 8, 9]);
        store.push(10).unwrap();
        assert_eq!(store.peek(), Some(10));
    }

    #[test]
    fn test_resize_to_zero() {
        let mut store = filled(4, &[1, 2]);
        assert_eq!(store.resize(0), 2);
        assert!(store.is_empty());
        assert!(store.is_full());
        assert_eq!(store.push(1), Err(StackError::Full));
        assert_eq!(store.pop(), Err(StackError::Empty));
    }

    #[test]
    fn test_huge_resize_only_moves_the_bound() {
        let mut store = filled(4, &[1, 2]);
        assert_eq!(store.resize(usize::MAX), 0);
        assert_eq!(store.capacity(), usize::MAX);
        assert_eq!(store.as_slice(), &[1, 2]);
        assert!(store.words.capacity() < 1024);

        store.push_many(&[3, 4, 5]).unwrap();
        assert_eq!(store.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(store.resize(1), 4);
        assert_eq!(store.as_slice(), &[1]);
    }

    #[test]
    fn test_grown_store_fills_to_new_bound() {
        let mut store = filled(2, &[1, 2]);
        store.resize(4);
        assert_eq!(store.push_many(&[3, 4, 5, 6]).unwrap(), 2);
        assert!(store.is_full());
        assert_eq!(store.push(7), Err(StackError::Full));
        assert_eq!(store.pop_many(4).unwrap(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_metrics_track_activity() {
        let mut store = filled(10, &[1, 2, 3, 4, 5, 6]);
        store.pop_many(2).unwrap();
        store.resize(3);
        let m = store.metrics();
        assert_eq!(m.pushed, 6);
        assert_eq!(m.popped, 2);
        assert_eq!(m.truncated, 1);
        assert_eq!(m.high_water, 6);
        assert!(check_all_invariants(&store).is_empty());
    }

    #[test]
    fn test_snapshot_matches_contents() {
        let store = filled(5, &[3, 1, 4]);
        let snap = store.snapshot();
        assert_eq!(snap.capacity, 5);
        assert_eq!(snap.words, vec![3, 1, 4]);
    }

    #[test]
    fn test_invariants_hold_through_mixed_sequence() {
        fn assert_consistent(store: &StackStore) {
            let violations = check_all_invariants(store);
            assert!(violations.is_empty(), "{:?}", violations);
        }

        let mut store = StackStore::new();
        let _ = store.push_many(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_consistent(&store);
        store.resize(4);
        assert_consistent(&store);
        let _ = store.pop();
        assert_consistent(&store);
        store.resize(20);
        assert_consistent(&store);
        let _ = store.push_many(&[0; 30]);
        assert_consistent(&store);
        let _ = store.pop_many(50);
        assert_consistent(&store);
        let _ = store.pop_many(1);
        assert_consistent(&store);
    }
}
