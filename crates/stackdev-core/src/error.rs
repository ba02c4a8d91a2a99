//! Error types for the store.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Reasons a store operation is refused.
///
/// A refused operation never changes the stored words, the occupancy or the
/// capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackError {
    /// No free slot at all (`size == capacity`)
    Full,
    /// No stored word at all (`size == 0`)
    Empty,
    /// Storage for a larger capacity could not be allocated
    OutOfMemory,
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Full => write!(f, "Stack is full"),
            StackError::Empty => write!(f, "Stack is empty"),
            StackError::OutOfMemory => write!(f, "Out of memory for stack storage"),
        }
    }
}
