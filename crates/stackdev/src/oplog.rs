//! Operation audit log
//!
//! One [`OpRecord`] per completed file operation, carrying what was asked,
//! when it ran, and the syscall-style result. The log is a bounded ring: once
//! [`MAX_OPLOG_RECORDS`] is reached the oldest record is evicted and counted.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Position of a record in the log, monotonic for the device's lifetime
pub type Seq = u64;

/// Identifier of an open handle on the device
pub type HandleId = u64;

/// Records kept before the oldest is evicted.
pub const MAX_OPLOG_RECORDS: usize = 4096;

/// File operation kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    Open,
    Read,
    Write,
    Control,
    Close,
}

/// A completed file operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpRecord {
    pub seq: Seq,
    pub handle: HandleId,
    pub kind: OpKind,
    /// Buffer length for read/write, command number for control, else 0
    pub arg: u64,
    /// HAL clock when the operation was entered
    pub started_nanos: u64,
    /// HAL clock when it returned
    pub finished_nanos: u64,
    /// Bytes moved or 0 on success; `-errno` on failure
    pub result: i64,
}

impl OpRecord {
    /// Whether the operation failed.
    pub fn is_failure(&self) -> bool {
        self.result < 0
    }

    /// The errno of a failed operation.
    pub fn errno(&self) -> Option<i32> {
        self.is_failure().then(|| (-self.result) as i32)
    }
}

/// Bounded log of completed operations.
#[derive(Debug, Default)]
pub struct OpLog {
    records: VecDeque<OpRecord>,
    next_seq: Seq,
    evicted: u64,
}

impl OpLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed operation and return its sequence number.
    pub fn record(
        &mut self,
        handle: HandleId,
        kind: OpKind,
        arg: u64,
        (started_nanos, finished_nanos): (u64, u64),
        result: i64,
    ) -> Seq {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.records.len() == MAX_OPLOG_RECORDS {
            self.records.pop_front();
            self.evicted += 1;
        }
        self.records.push_back(OpRecord {
            seq,
            handle,
            kind,
            arg,
            started_nanos,
            finished_nanos,
            result,
        });
        seq
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &OpRecord> {
        self.records.iter()
    }

    /// The `count` newest records, newest first.
    pub fn latest(&self, count: usize) -> Vec<&OpRecord> {
        self.records.iter().rev().take(count).collect()
    }

    /// Retained records issued on `handle`, oldest first.
    pub fn for_handle(&self, handle: HandleId) -> Vec<&OpRecord> {
        self.records.iter().filter(|r| r.handle == handle).collect()
    }

    /// Retained records of failed operations, oldest first.
    pub fn failures(&self) -> Vec<&OpRecord> {
        self.records.iter().filter(|r| r.is_failure()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dropped to stay within [`MAX_OPLOG_RECORDS`].
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
