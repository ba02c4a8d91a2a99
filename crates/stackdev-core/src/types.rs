//! Core store types
//!
//! Pure data shared by the store and the device layer.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// One stack element: a 32-bit integer kept in host byte order.
pub type Word = u32;

/// Size of a [`Word`] in bytes.
pub const WORD_SIZE: usize = core::mem::size_of::<Word>();

/// Capacity a freshly created store gets, in words.
pub const DEFAULT_CAPACITY: usize = 10;

/// Per-store activity counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackMetrics {
    /// Words accepted by push
    pub pushed: u64,
    /// Words removed by pop
    pub popped: u64,
    /// Words discarded from the top by a shrinking resize
    pub truncated: u64,
    /// Pushes refused because the store was full
    pub refused_pushes: u64,
    /// Pops refused because the store was empty
    pub refused_pops: u64,
    /// High water mark (max occupancy seen)
    pub high_water: usize,
}

/// Point-in-time copy of a store's contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSnapshot {
    /// Capacity at the time of the snapshot
    pub capacity: usize,
    /// Occupied words, bottom first
    pub words: Vec<Word>,
}

impl StackSnapshot {
    /// Number of words held.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the snapshot holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The most recently pushed word, if any.
    pub fn top(&self) -> Option<Word> {
        self.words.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_word_size_is_four_bytes() {
        assert_eq!(WORD_SIZE, 4);
    }

    #[test]
    fn test_snapshot_top_is_last_word() {
        let snap = StackSnapshot {
            capacity: 4,
            words: vec![1, 2, 3],
        };
        assert_eq!(snap.top(), Some(3));
        assert_eq!(snap.len(), 3);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_bottom_first() {
        let snap = StackSnapshot {
            capacity: 2,
            words: vec![7, 9],
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"capacity":2,"words":[7,9]}"#);

        let back: StackSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
