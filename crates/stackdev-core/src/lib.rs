//! Stack Device Core - Pure Bounded LIFO Store
//!
//! This crate contains the **pure, HAL-free** state of the stack device: a
//! fixed-capacity, word-addressed LIFO buffer.
//!
//! # Design Principles
//!
//! 1. **No HAL dependency**: logging and timing live in `stackdev`
//! 2. **No I/O or side effects**: pure state transformations only
//! 3. **Immediate outcomes**: every operation completes or is refused at once,
//!    nothing ever waits for room or data
//! 4. **Checkable**: invariants can be asserted after any operation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      stackdev-core                          │
//! │                                                             │
//! │   words:    [ w0 | w1 | w2 | .. | w(size-1) ]   capacity    │
//! │               ^bottom            ^top           (a bound)   │
//! │                                                             │
//! │   push / push_many   -> append at `size`                    │
//! │   pop / pop_many     -> remove from `size - 1` downward     │
//! │   resize             -> move the bound, drop from the top   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              │ used by
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        stackdev                             │
//! │   byte/word marshalling, control commands, errno contract   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `types` - Word type, default capacity, metrics, snapshots
//! - `error` - Store refusal kinds
//! - `store` - The `StackStore` itself
//! - `invariants` - Runtime-checkable invariant assertions

#![no_std]
extern crate alloc;

pub mod error;
pub mod invariants;
pub mod store;
pub mod types;

pub use error::StackError;
pub use invariants::{check_all_invariants, InvariantViolation};
pub use store::StackStore;
pub use types::{StackMetrics, StackSnapshot, Word, DEFAULT_CAPACITY, WORD_SIZE};
