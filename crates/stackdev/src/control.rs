//! Control-operation (ioctl) codec
//!
//! Commands follow the Linux `_IOC` layout:
//!
//! ```text
//!  31 30 29            16 15       8 7        0
//! ┌─────┬────────────────┬──────────┬──────────┐
//! │ dir │      size      │   type   │    nr    │
//! └─────┴────────────────┴──────────┴──────────┘
//! ```
//!
//! | Command | Encoding | Payload |
//! |---------|----------|---------|
//! | Resize | `_IOW('a', 1, 8)` | new capacity, u64 host order |
//! | Capacity | `_IOR('a', 2, 8)` | out: capacity, u64 host order |
//! | Size | `_IOR('a', 3, 8)` | out: occupancy, u64 host order |

use crate::error::DeviceError;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_DIRBITS: u32 = 2;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_NRMASK: u32 = (1 << IOC_NRBITS) - 1;
const IOC_TYPEMASK: u32 = (1 << IOC_TYPEBITS) - 1;
const IOC_SIZEMASK: u32 = (1 << IOC_SIZEBITS) - 1;
const IOC_DIRMASK: u32 = (1 << IOC_DIRBITS) - 1;

/// No data transfer
pub const IOC_NONE: u32 = 0;
/// Caller writes data to the device
pub const IOC_WRITE: u32 = 1;
/// Caller reads data from the device
pub const IOC_READ: u32 = 2;

/// Command type byte of the stack device
pub const STACK_IOC_MAGIC: u8 = b'a';

/// Size of every stack control payload
pub const CONTROL_PAYLOAD_SIZE: usize = core::mem::size_of::<u64>();

/// Set a new capacity
pub const STACK_IOC_RESIZE: u32 = iow(STACK_IOC_MAGIC, 1, CONTROL_PAYLOAD_SIZE as u32);
/// Query the current capacity
pub const STACK_IOC_CAPACITY: u32 = ior(STACK_IOC_MAGIC, 2, CONTROL_PAYLOAD_SIZE as u32);
/// Query the current occupancy
pub const STACK_IOC_SIZE: u32 = ior(STACK_IOC_MAGIC, 3, CONTROL_PAYLOAD_SIZE as u32);

/// Build a command number (`_IOC`).
pub const fn ioc(dir: u32, ty: u8, nr: u8, size: u32) -> u32 {
    ((dir & IOC_DIRMASK) << IOC_DIRSHIFT)
        | ((size & IOC_SIZEMASK) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// Command that writes `size` bytes to the device (`_IOW`).
pub const fn iow(ty: u8, nr: u8, size: u32) -> u32 {
    ioc(IOC_WRITE, ty, nr, size)
}

/// Command that reads `size` bytes from the device (`_IOR`).
pub const fn ior(ty: u8, nr: u8, size: u32) -> u32 {
    ioc(IOC_READ, ty, nr, size)
}

/// Direction bits of a command.
pub const fn ioc_dir(cmd: u32) -> u32 {
    (cmd >> IOC_DIRSHIFT) & IOC_DIRMASK
}

/// Type byte of a command.
pub const fn ioc_type(cmd: u32) -> u8 {
    ((cmd >> IOC_TYPESHIFT) & IOC_TYPEMASK) as u8
}

/// Number byte of a command.
pub const fn ioc_nr(cmd: u32) -> u8 {
    ((cmd >> IOC_NRSHIFT) & IOC_NRMASK) as u8
}

/// Payload size field of a command.
pub const fn ioc_size(cmd: u32) -> u32 {
    (cmd >> IOC_SIZESHIFT) & IOC_SIZEMASK
}

/// A decoded control request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlRequest {
    /// Change the capacity
    Resize { new_capacity: u64 },
    /// Report the capacity
    Capacity,
    /// Report the occupancy
    Size,
}

impl ControlRequest {
    /// Decode a command number and its payload.
    ///
    /// The payload must be exactly as long as the size field of the command.
    /// For the query commands the payload is the output buffer and its
    /// contents are ignored here.
    pub fn decode(cmd: u32, payload: &[u8]) -> Result<Self, DeviceError> {
        if ioc_type(cmd) != STACK_IOC_MAGIC {
            return Err(DeviceError::UnknownCommand { cmd });
        }

        let expected = match ioc_nr(cmd) {
            1 => STACK_IOC_RESIZE,
            2 => STACK_IOC_CAPACITY,
            3 => STACK_IOC_SIZE,
            _ => return Err(DeviceError::UnknownCommand { cmd }),
        };
        // Same nr, wrong direction or size
        if cmd != expected {
            return Err(DeviceError::InvalidArgument);
        }
        if payload.len() != CONTROL_PAYLOAD_SIZE {
            return Err(DeviceError::InvalidArgument);
        }

        match cmd {
            STACK_IOC_RESIZE => Ok(ControlRequest::Resize {
                new_capacity: decode_u64(payload)?,
            }),
            STACK_IOC_CAPACITY => Ok(ControlRequest::Capacity),
            _ => Ok(ControlRequest::Size),
        }
    }

    /// Encode into a command number and payload.
    pub fn encode(&self) -> (u32, [u8; CONTROL_PAYLOAD_SIZE]) {
        match *self {
            ControlRequest::Resize { new_capacity } => {
                (STACK_IOC_RESIZE, new_capacity.to_ne_bytes())
            }
            ControlRequest::Capacity => (STACK_IOC_CAPACITY, [0; CONTROL_PAYLOAD_SIZE]),
            ControlRequest::Size => (STACK_IOC_SIZE, [0; CONTROL_PAYLOAD_SIZE]),
        }
    }

    /// The command number of this request.
    pub fn cmd(&self) -> u32 {
        self.encode().0
    }
}

/// Read a host-order u64 from an 8-byte payload.
pub fn decode_u64(payload: &[u8]) -> Result<u64, DeviceError> {
    let bytes: [u8; CONTROL_PAYLOAD_SIZE] = payload
        .try_into()
        .map_err(|_| DeviceError::InvalidArgument)?;
    Ok(u64::from_ne_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_numbers_match_linux_layout() {
        assert_eq!(STACK_IOC_RESIZE, 0x4008_6101);
        assert_eq!(STACK_IOC_CAPACITY, 0x8008_6102);
        assert_eq!(STACK_IOC_SIZE, 0x8008_6103);
    }

    #[test]
    fn test_field_accessors() {
        assert_eq!(ioc_dir(STACK_IOC_RESIZE), IOC_WRITE);
        assert_eq!(ioc_type(STACK_IOC_RESIZE), b'a');
        assert_eq!(ioc_nr(STACK_IOC_RESIZE), 1);
        assert_eq!(ioc_size(STACK_IOC_RESIZE), 8);
        assert_eq!(ioc_dir(ioc(IOC_NONE, b'x', 9, 0)), IOC_NONE);
    }

    #[test]
    fn test_decode_resize() {
        let payload = 7u64.to_ne_bytes();
        assert_eq!(
            ControlRequest::decode(STACK_IOC_RESIZE, &payload).unwrap(),
            ControlRequest::Resize { new_capacity: 7 }
        );
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let payload = 7u32.to_ne_bytes();
        assert_eq!(
            ControlRequest::decode(STACK_IOC_RESIZE, &payload),
            Err(DeviceError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_size_field() {
        // _IOW('a', 1, int32_t) instead of the 8-byte form
        let cmd = iow(b'a', 1, 4);
        assert_eq!(
            ControlRequest::decode(cmd, &[0; 4]),
            Err(DeviceError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_direction() {
        let cmd = ior(b'a', 1, 8);
        assert_eq!(
            ControlRequest::decode(cmd, &[0; 8]),
            Err(DeviceError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_unknown_commands() {
        let foreign = iow(b'T', 1, 8);
        assert_eq!(
            ControlRequest::decode(foreign, &[0; 8]),
            Err(DeviceError::UnknownCommand { cmd: foreign })
        );
        let unknown_nr = iow(b'a', 9, 8);
        assert_eq!(
            ControlRequest::decode(unknown_nr, &[0; 8]),
            Err(DeviceError::UnknownCommand { cmd: unknown_nr })
        );
    }

    #[test]
    fn test_encode_decode_agree() {
        for req in [
            ControlRequest::Resize { new_capacity: u64::MAX },
            ControlRequest::Capacity,
            ControlRequest::Size,
        ] {
            let (cmd, payload) = req.encode();
            assert_eq!(ControlRequest::decode(cmd, &payload).unwrap(), req);
            assert_eq!(req.cmd(), cmd);
        }
    }
}
