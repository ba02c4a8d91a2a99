//! Error types and the errno contract of the device.

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};
use stackdev_core::StackError;

/// Linux errno values returned across the file interface.
pub mod errno {
    /// Bad file descriptor
    pub const EBADF: i32 = 9;
    /// Out of memory
    pub const ENOMEM: i32 = 12;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
    /// No space left on device (used for an empty stack)
    pub const ENOSPC: i32 = 28;
    /// No buffer space available (used for a full stack)
    pub const ENOBUFS: i32 = 105;
}

/// Errors from device operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceError {
    /// Write against a stack with no free slot
    Full,

    /// Read against a stack holding no words
    Empty,

    /// Malformed argument (control payload, read size, capacity bound)
    InvalidArgument,

    /// Control command this device does not know
    UnknownCommand {
        /// The raw command number
        cmd: u32,
    },

    /// Device configuration rejected
    InvalidConfig(String),

    /// Stack storage could not be allocated
    OutOfMemory,

    /// Operation on a handle that was already closed
    BadHandle,
}

impl DeviceError {
    /// Create an invalid config error with message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// The errno reported to the caller of the file operation.
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::Full => errno::ENOBUFS,
            DeviceError::Empty => errno::ENOSPC,
            DeviceError::InvalidArgument
            | DeviceError::UnknownCommand { .. }
            | DeviceError::InvalidConfig(_) => errno::EINVAL,
            DeviceError::OutOfMemory => errno::ENOMEM,
            DeviceError::BadHandle => errno::EBADF,
        }
    }

    /// Kernel-style return value: the negated errno.
    pub fn to_syscall_ret(&self) -> i64 {
        -i64::from(self.errno())
    }

    /// Map an errno seen on the user side back to a device error.
    ///
    /// `EINVAL` always maps to `InvalidArgument`.
    pub fn from_errno(code: i32) -> Option<Self> {
        match code {
            errno::ENOBUFS => Some(DeviceError::Full),
            errno::ENOSPC => Some(DeviceError::Empty),
            errno::EINVAL => Some(DeviceError::InvalidArgument),
            errno::ENOMEM => Some(DeviceError::OutOfMemory),
            errno::EBADF => Some(DeviceError::BadHandle),
            _ => None,
        }
    }

    /// Check if this is a capacity refusal (full or empty).
    pub fn is_capacity_refusal(&self) -> bool {
        matches!(self, DeviceError::Full | DeviceError::Empty)
    }
}

impl From<StackError> for DeviceError {
    fn from(e: StackError) -> Self {
        match e {
            StackError::Full => DeviceError::Full,
            StackError::Empty => DeviceError::Empty,
            StackError::OutOfMemory => DeviceError::OutOfMemory,
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Full => write!(f, "Stack is full"),
            DeviceError::Empty => write!(f, "Stack is empty"),
            DeviceError::InvalidArgument => write!(f, "Invalid argument"),
            DeviceError::UnknownCommand { cmd } => write!(f, "Unknown control command: 0x{:08x}", cmd),
            DeviceError::InvalidConfig(msg) => write!(f, "Invalid device config: {}", msg),
            DeviceError::OutOfMemory => write!(f, "Out of memory"),
            DeviceError::BadHandle => write!(f, "Bad handle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_capacity_refusals_map_to_linux_errno() {
        assert_eq!(DeviceError::Full.errno(), 105);
        assert_eq!(DeviceError::Empty.errno(), 28);
        assert_eq!(DeviceError::InvalidArgument.errno(), 22);
        assert_eq!(DeviceError::UnknownCommand { cmd: 7 }.errno(), 22);
    }

    #[test]
    fn test_syscall_ret_is_negated_errno() {
        assert_eq!(DeviceError::Full.to_syscall_ret(), -105);
        assert_eq!(DeviceError::BadHandle.to_syscall_ret(), -9);
    }

    #[test]
    fn test_from_errno() {
        assert_eq!(DeviceError::from_errno(errno::ENOBUFS), Some(DeviceError::Full));
        assert_eq!(DeviceError::from_errno(errno::ENOSPC), Some(DeviceError::Empty));
        assert_eq!(DeviceError::from_errno(1), None);
    }

    #[test]
    fn test_from_stack_error() {
        assert_eq!(DeviceError::from(StackError::Full), DeviceError::Full);
        assert_eq!(DeviceError::from(StackError::Empty), DeviceError::Empty);
        assert_eq!(DeviceError::from(StackError::OutOfMemory), DeviceError::OutOfMemory);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DeviceError::UnknownCommand { cmd: 0x4008_6109 }.to_string(),
            "Unknown control command: 0x40086109"
        );
        assert!(DeviceError::Full.is_capacity_refusal());
        assert!(!DeviceError::BadHandle.is_capacity_refusal());
    }
}
