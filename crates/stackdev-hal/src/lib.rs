//! Platform abstraction for the stack device
//!
//! The device layer never talks to the platform directly. Everything it needs
//! from the host goes through the [`HAL`] trait:
//!
//! - **Time**: monotonic nanoseconds, used to stamp audit events
//! - **Debug output**: the kernel console (`printk` on a real kernel,
//!   stderr when hosted, a capture buffer in tests)
//!
//! # Platform Implementations
//!
//! - [`TestHal`]: stub clock, discards output. For unit tests.
//! - [`StdHal`] (feature `std`): `Instant`-based clock, writes to stderr.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

use core::sync::atomic::{AtomicU64, Ordering};

/// Hardware Abstraction Layer trait
///
/// Implementations provide platform-specific functionality for:
/// - Time measurement
/// - Debug output
pub trait HAL: Send + Sync + 'static {
    // === Time ===

    /// Get current time in nanoseconds (monotonic)
    fn now_nanos(&self) -> u64;

    // === Debug ===

    /// Write a debug message to the platform's console/log
    fn debug_write(&self, msg: &str);
}

impl<T: HAL> HAL for &'static T {
    fn now_nanos(&self) -> u64 {
        (**self).now_nanos()
    }

    fn debug_write(&self, msg: &str) {
        (**self).debug_write(msg)
    }
}

/// A minimal test HAL for unit testing
///
/// The clock only moves when [`TestHal::advance_time`] is called and debug
/// output is discarded.
#[derive(Default)]
pub struct TestHal {
    time: AtomicU64,
}

impl TestHal {
    pub fn new() -> Self {
        Self {
            time: AtomicU64::new(0),
        }
    }

    /// Advance the simulated clock
    pub fn advance_time(&self, nanos: u64) {
        self.time.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl HAL for TestHal {
    fn now_nanos(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    fn debug_write(&self, _msg: &str) {
        // No-op for tests
    }
}

/// Hosted HAL backed by the standard library.
#[cfg(feature = "std")]
pub struct StdHal {
    boot: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdHal {
    pub fn new() -> Self {
        Self {
            boot: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdHal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl HAL for StdHal {
    fn now_nanos(&self) -> u64 {
        // Saturates after ~584 years of uptime
        u64::try_from(self.boot.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn debug_write(&self, msg: &str) {
        std::eprintln!("{}", msg);
    }
}
