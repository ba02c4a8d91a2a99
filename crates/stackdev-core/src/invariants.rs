//! Runtime-checkable store invariants
//!
//! These are used for:
//! 1. Runtime assertion checking during development
//! 2. Scenario tests, which assert after every step
//! 3. Formal verification with Kani
//!
//! # Invariants
//!
//! 1. **Occupancy Bound**: `len <= capacity`, including right after a resize
//! 2. **Room Accounting**: `room + len == capacity`
//! 3. **Conservation**: `pushed - popped - truncated == len`
//! 4. **High Water**: the high water mark never lies below the occupancy
//!
//! The checks only go through the store's counting accessors, so a corrupt
//! store is reported rather than panicking on an out-of-range slice.

use alloc::string::String;
use alloc::vec::Vec;

use crate::store::StackStore;

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all store invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(store: &StackStore) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    violations.extend(check_occupancy_bound(store));
    violations.extend(check_room_accounting(store));
    violations.extend(check_conservation(store));
    violations.extend(check_high_water(store));

    violations
}

/// Invariant 1: size never exceeds capacity
fn check_occupancy_bound(store: &StackStore) -> Option<InvariantViolation> {
    (store.len() > store.capacity()).then(|| InvariantViolation {
        invariant: "occupancy_bound",
        description: alloc::format!(
            "Store holds {} words but capacity is {}",
            store.len(),
            store.capacity()
        ),
    })
}

/// Invariant 2: free slots and held words add up to the capacity
fn check_room_accounting(store: &StackStore) -> Option<InvariantViolation> {
    (store.room().checked_add(store.len()) != Some(store.capacity())).then(|| InvariantViolation {
        invariant: "room_accounting",
        description: alloc::format!(
            "room {} + size {} does not equal capacity {}",
            store.room(),
            store.len(),
            store.capacity()
        ),
    })
}

/// Invariant 3: every held word was pushed and not yet popped or truncated
fn check_conservation(store: &StackStore) -> Option<InvariantViolation> {
    let m = store.metrics();
    let removed = m.popped + m.truncated;
    let held = m.pushed.checked_sub(removed);
    (held != Some(store.len() as u64)).then(|| InvariantViolation {
        invariant: "conservation",
        description: alloc::format!(
            "pushed {} - popped {} - truncated {} does not equal size {}",
            m.pushed,
            m.popped,
            m.truncated,
            store.len()
        ),
    })
}

/// Invariant 4: the high water mark covers the current occupancy
fn check_high_water(store: &StackStore) -> Option<InvariantViolation> {
    let high_water = store.metrics().high_water;
    (high_water < store.len()).then(|| InvariantViolation {
        invariant: "high_water",
        description: alloc::format!(
            "High water mark {} is below size {}",
            high_water,
            store.len()
        ),
    })
}

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: any push/pop/resize sequence keeps size within capacity
    #[kani::proof]
    #[kani::unwind(6)]
    fn operations_keep_occupancy_bound() {
        let capacity: usize = kani::any();
        kani::assume(capacity <= 4);
        let mut store = StackStore::with_capacity(capacity);

        for _ in 0..4 {
            let op: u8 = kani::any();
            match op % 3 {
                0 => {
                    let _ = store.push(kani::any());
                }
                1 => {
                    let _ = store.pop();
                }
                _ => {
                    let new_capacity: usize = kani::any();
                    kani::assume(new_capacity <= 4);
                    store.resize(new_capacity);
                }
            }
            assert!(store.len() <= store.capacity());
        }
    }
}
