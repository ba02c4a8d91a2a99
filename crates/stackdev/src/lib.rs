//! Stack Device
//!
//! A fixed-capacity, word-addressed LIFO exposed through the usual special
//! file operations:
//!
//! - **Channel**: byte buffers in, whole 32-bit words on the stack
//! - **Control**: `_IOC`-encoded commands (resize, capacity and size queries)
//! - **Errors**: `ENOBUFS` for a full stack, `ENOSPC` for an empty one,
//!   `EINVAL` for malformed requests
//! - **Device**: the node, its open handles, and the operation audit log
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  StackDevice (node: config, HAL, OpLog, handle accounting)        │
//! │                                                                   │
//! │   open() ──▶ StackFile ── write / read / ioctl / close            │
//! │                 │                                                 │
//! │                 ▼                                                 │
//! │            DeviceChannel  (bytes ⇄ words, ControlRequest, errno)  │
//! │                 │                                                 │
//! │                 ▼                                                 │
//! │        Arc<Mutex<StackStore>>  (per open, or one per device)      │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Partial transfers
//!
//! A write that fits only partly succeeds with the bytes actually consumed; a
//! read that finds fewer words than requested succeeds with what was there.
//! Only a write against a stack with no room at all, or a read against a
//! stack with nothing in it, fails.

#![no_std]
extern crate alloc;

pub mod channel;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod oplog;

// Convenient re-exports at crate root
pub use channel::{bytes_from_words, words_from_bytes, ControlReply, DeviceChannel};
pub use config::{DeviceConfig, ReadAlignment, StackScope, DEFAULT_CLASS_NAME, DEFAULT_DEVICE_NAME};
pub use control::{
    ioc, ioc_dir, ioc_nr, ioc_size, ioc_type, ior, iow, ControlRequest, CONTROL_PAYLOAD_SIZE,
    IOC_NONE, IOC_READ, IOC_WRITE, STACK_IOC_CAPACITY, STACK_IOC_MAGIC, STACK_IOC_RESIZE,
    STACK_IOC_SIZE,
};
pub use device::{StackDevice, StackFile};
pub use error::{errno, DeviceError};
pub use oplog::{HandleId, OpKind, OpLog, OpRecord, Seq, MAX_OPLOG_RECORDS};

pub use stackdev_core::{
    check_all_invariants, InvariantViolation, StackError, StackMetrics, StackSnapshot, StackStore,
    Word, DEFAULT_CAPACITY, WORD_SIZE,
};
pub use stackdev_hal::{TestHal, HAL};
