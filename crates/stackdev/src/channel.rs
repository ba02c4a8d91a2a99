//! Byte-oriented channel over a [`StackStore`]
//!
//! The channel turns file-interface byte buffers into whole words and back,
//! forwards control requests, and maps store refusals onto [`DeviceError`].
//! It holds nothing but a reference to the store; the store itself sits
//! behind a mutex so every operation observes and mutates it atomically.

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;
use stackdev_core::{StackMetrics, StackSnapshot, StackStore, Word, WORD_SIZE};

use crate::control::ControlRequest;
use crate::error::DeviceError;

/// Split bytes into host-order words.
///
/// A trailing chunk shorter than a word is zero-filled in its high-address
/// bytes and kept as one more word.
pub fn words_from_bytes(bytes: &[u8]) -> Vec<Word> {
    bytes
        .chunks(WORD_SIZE)
        .map(|chunk| {
            let mut raw = [0u8; WORD_SIZE];
            raw[..chunk.len()].copy_from_slice(chunk);
            Word::from_ne_bytes(raw)
        })
        .collect()
}

/// Pack words into host-order bytes, in the given order.
pub fn bytes_from_words(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_ne_bytes()).collect()
}

/// Outcome of a successful control request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlReply {
    /// Capacity changed from `old_capacity` to `new_capacity`; `truncated`
    /// words were discarded from the top
    Resized {
        old_capacity: usize,
        new_capacity: usize,
        truncated: usize,
    },
    /// Current capacity in words
    Capacity(u64),
    /// Current occupancy in words
    Size(u64),
}

/// Byte interface to exactly one stack store.
#[derive(Clone)]
pub struct DeviceChannel {
    store: Arc<Mutex<StackStore>>,
}

impl DeviceChannel {
    /// Channel that exclusively owns `store`.
    pub fn new(store: StackStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Channel over a store shared with other channels.
    pub fn shared(store: Arc<Mutex<StackStore>>) -> Self {
        Self { store }
    }

    /// Push the words of `bytes` and report the bytes consumed.
    ///
    /// The count is `WORD_SIZE` times the words pushed, so a padded trailing
    /// word counts as a full word. Fewer bytes than offered is a partial
    /// write, not a failure. Fails with [`DeviceError::Full`] only when the
    /// store had no room at all.
    ///
    /// Only the leading bytes that fit are converted to words.
    pub fn handle_write(&self, bytes: &[u8]) -> Result<usize, DeviceError> {
        let mut store = self.store.lock();
        // A full store is still offered one word so the refusal is recorded
        let fitting = bytes.len().div_ceil(WORD_SIZE).min(store.room().max(1));
        let end = bytes.len().min(fitting * WORD_SIZE);
        let pushed = store.push_many(&words_from_bytes(&bytes[..end]))?;
        Ok(pushed * WORD_SIZE)
    }

    /// Pop up to `requested_words` words, top first, packed as bytes.
    ///
    /// Fewer words than requested is a partial read, not a failure. Fails
    /// with [`DeviceError::Empty`] only when the store held no words.
    pub fn handle_read(&self, requested_words: usize) -> Result<Vec<u8>, DeviceError> {
        let words = self.store.lock().pop_many(requested_words)?;
        Ok(bytes_from_words(&words))
    }

    /// Change the capacity.
    ///
    /// The old capacity and the truncation are read under the same lock as
    /// the change itself.
    pub fn handle_resize(&self, new_capacity: u64) -> Result<ControlReply, DeviceError> {
        let new_capacity = usize::try_from(new_capacity).map_err(|_| DeviceError::InvalidArgument)?;
        let mut store = self.store.lock();
        let old_capacity = store.capacity();
        let truncated = store.resize(new_capacity);
        Ok(ControlReply::Resized {
            old_capacity,
            new_capacity,
            truncated,
        })
    }

    /// Execute a decoded control request.
    pub fn handle_control(&self, request: ControlRequest) -> Result<ControlReply, DeviceError> {
        match request {
            ControlRequest::Resize { new_capacity } => self.handle_resize(new_capacity),
            ControlRequest::Capacity => Ok(ControlReply::Capacity(self.capacity() as u64)),
            ControlRequest::Size => Ok(ControlReply::Size(self.len() as u64)),
        }
    }

    /// Current capacity in words.
    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    /// Current occupancy in words.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Copy of the store contents.
    pub fn snapshot(&self) -> StackSnapshot {
        self.store.lock().snapshot()
    }

    /// Copy of the store counters.
    pub fn metrics(&self) -> StackMetrics {
        self.store.lock().metrics().clone()
    }

    /// Run `f` against the store under the lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&StackStore) -> R) -> R {
        f(&self.store.lock())
    }
}
