//! Device node and open handles
//!
//! [`StackDevice`] is the registered node. [`StackDevice::open`] hands out a
//! [`StackFile`], which carries the file operations:
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `write(buf)` | bytes consumed, or `ENOBUFS` when the stack had no room |
//! | `read(buf)` | bytes produced, or `ENOSPC` when the stack held nothing |
//! | `ioctl(cmd, arg)` | `0`, or `EINVAL` for malformed/unknown commands |
//! | `close()` | releases the handle; also done on drop |
//!
//! Every operation is audited in the device's [`OpLog`] and never blocks.

use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use spin::Mutex;
use stackdev_core::{StackMetrics, StackSnapshot, StackStore, WORD_SIZE};
use stackdev_hal::HAL;

use crate::channel::{ControlReply, DeviceChannel};
use crate::config::{DeviceConfig, ReadAlignment, StackScope};
use crate::control::ControlRequest;
use crate::error::DeviceError;
use crate::oplog::{HandleId, OpKind, OpLog};

/// A registered stack device node.
pub struct StackDevice<H: HAL> {
    config: DeviceConfig,
    hal: H,
    /// Store shared by all handles (`StackScope::PerDevice` only)
    shared: Option<Arc<Mutex<StackStore>>>,
    oplog: Mutex<OpLog>,
    next_handle: AtomicU64,
    open_handles: AtomicUsize,
}

impl<H: HAL> StackDevice<H> {
    /// Register a device with the given config.
    pub fn new(config: DeviceConfig, hal: H) -> Result<Self, DeviceError> {
        config.validate()?;

        let shared = match config.scope {
            StackScope::PerOpen => None,
            StackScope::PerDevice => Some(Arc::new(Mutex::new(StackStore::with_capacity(
                config.default_capacity,
            )))),
        };

        hal.debug_write(&alloc::format!(
            "[stackdev] Registered device '{}' (class '{}', capacity {}, scope {:?})",
            config.name,
            config.class_name,
            config.default_capacity,
            config.scope
        ));

        Ok(Self {
            config,
            hal,
            shared,
            oplog: Mutex::new(OpLog::new()),
            next_handle: AtomicU64::new(1),
            open_handles: AtomicUsize::new(0),
        })
    }

    /// Register a device with the default config.
    pub fn with_defaults(hal: H) -> Result<Self, DeviceError> {
        Self::new(DeviceConfig::default(), hal)
    }

    /// Get the device config.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Get reference to HAL.
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Run `f` against the audit log.
    pub fn with_oplog<R>(&self, f: impl FnOnce(&OpLog) -> R) -> R {
        f(&self.oplog.lock())
    }

    /// Open a new handle.
    pub fn open(&self) -> Result<StackFile<'_, H>, DeviceError> {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);

        let channel = self.audited(handle, OpKind::Open, 0, |_: &DeviceChannel| 0, || {
            Ok(match &self.shared {
                Some(store) => DeviceChannel::shared(store.clone()),
                None => DeviceChannel::new(StackStore::with_capacity(self.config.default_capacity)),
            })
        })?;

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        self.hal.debug_write(&alloc::format!(
            "[stackdev] Device has been opened (handle {})",
            handle
        ));

        Ok(StackFile {
            device: self,
            channel,
            handle,
            closed: false,
        })
    }

    /// Run one file operation and append its outcome to the audit log.
    fn audited<T>(
        &self,
        handle: HandleId,
        kind: OpKind,
        arg: u64,
        ret: impl FnOnce(&T) -> i64,
        op: impl FnOnce() -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let started = self.hal.now_nanos();
        let result = op();
        let code = match &result {
            Ok(value) => ret(value),
            Err(e) => e.to_syscall_ret(),
        };

        let finished = self.hal.now_nanos();
        self.oplog
            .lock()
            .record(handle, kind, arg, (started, finished), code);
        result
    }
}

/// An open handle on a [`StackDevice`].
pub struct StackFile<'a, H: HAL> {
    device: &'a StackDevice<H>,
    channel: DeviceChannel,
    handle: HandleId,
    closed: bool,
}

impl<'a, H: HAL> StackFile<'a, H> {
    /// Handle identifier used in the audit log.
    pub fn handle_id(&self) -> HandleId {
        self.handle
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write words packed in `buf`; returns bytes consumed.
    pub fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        self.device.audited(
            self.handle,
            OpKind::Write,
            buf.len() as u64,
            |n: &usize| *n as i64,
            || {
                self.ensure_open()?;
                let result = self.channel.handle_write(buf);
                if let Err(DeviceError::Full) = result {
                    self.log(alloc::format!(
                        "Write of {} bytes refused - stack is full",
                        buf.len()
                    ));
                }
                result
            },
        )
    }

    /// Read up to `buf.len() / WORD_SIZE` words into `buf`, top first;
    /// returns bytes produced.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let len = buf.len();
        self.device.audited(
            self.handle,
            OpKind::Read,
            len as u64,
            |n: &usize| *n as i64,
            || {
                self.ensure_open()?;
                if self.device.config.read_alignment == ReadAlignment::Reject && len % WORD_SIZE != 0 {
                    return Err(DeviceError::InvalidArgument);
                }

                let bytes = match self.channel.handle_read(len / WORD_SIZE) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        if e == DeviceError::Empty {
                            self.log(alloc::format!(
                                "Read of {} bytes refused - stack is empty",
                                len
                            ));
                        }
                        return Err(e);
                    }
                };
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            },
        )
    }

    /// Issue a control command; `arg` is the command payload.
    ///
    /// For query commands the answer is written into `arg`.
    pub fn ioctl(&self, cmd: u32, arg: &mut [u8]) -> Result<i64, DeviceError> {
        self.device.audited(self.handle, OpKind::Control, u64::from(cmd), |r: &i64| *r, || {
            self.ensure_open()?;
            let request = ControlRequest::decode(cmd, arg).map_err(|e| {
                if let DeviceError::UnknownCommand { cmd } = e {
                    self.log(alloc::format!("Unknown control command: 0x{:08x}", cmd));
                }
                e
            })?;

            if let ControlRequest::Resize { new_capacity } = request {
                if !self.device.config.allows_capacity(new_capacity) {
                    self.log(alloc::format!(
                        "Resize to {} refused - above max capacity",
                        new_capacity
                    ));
                    return Err(DeviceError::InvalidArgument);
                }
            }

            match self.channel.handle_control(request)? {
                ControlReply::Resized {
                    old_capacity,
                    new_capacity,
                    truncated,
                } => {
                    self.log(alloc::format!(
                        "Changed stack size from {} to {} ({} words truncated)",
                        old_capacity,
                        new_capacity,
                        truncated
                    ));
                }
                ControlReply::Capacity(value) | ControlReply::Size(value) => {
                    arg.copy_from_slice(&value.to_ne_bytes());
                }
            }
            Ok(0)
        })
    }

    /// Change the capacity through the resize command.
    pub fn resize(&self, new_capacity: u64) -> Result<(), DeviceError> {
        let (cmd, mut payload) = ControlRequest::Resize { new_capacity }.encode();
        self.ioctl(cmd, &mut payload).map(|_| ())
    }

    /// Query the capacity through the control interface.
    pub fn capacity(&self) -> Result<u64, DeviceError> {
        self.query(ControlRequest::Capacity)
    }

    /// Query the occupancy through the control interface.
    pub fn size(&self) -> Result<u64, DeviceError> {
        self.query(ControlRequest::Size)
    }

    fn query(&self, request: ControlRequest) -> Result<u64, DeviceError> {
        let (cmd, mut payload) = request.encode();
        self.ioctl(cmd, &mut payload)?;
        Ok(u64::from_ne_bytes(payload))
    }

    /// Copy of the stack contents behind this handle.
    pub fn snapshot(&self) -> StackSnapshot {
        self.channel.snapshot()
    }

    /// Counters of the stack behind this handle.
    pub fn metrics(&self) -> StackMetrics {
        self.channel.metrics()
    }

    /// Run `f` against the stack behind this handle, under its lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&StackStore) -> R) -> R {
        self.channel.with_store(f)
    }

    /// Release the handle.
    ///
    /// Closing twice fails with [`DeviceError::BadHandle`].
    pub fn close(&mut self) -> Result<(), DeviceError> {
        let device = self.device;
        let already_closed = self.closed;
        device.audited(self.handle, OpKind::Close, 0, |_: &()| 0, || {
            if already_closed {
                return Err(DeviceError::BadHandle);
            }
            Ok(())
        })?;

        self.closed = true;
        device.open_handles.fetch_sub(1, Ordering::SeqCst);
        self.log(String::from("Device successfully closed"));
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::BadHandle);
        }
        Ok(())
    }

    fn log(&self, msg: String) {
        self.device.hal.debug_write(&alloc::format!(
            "[stackdev] handle {}: {}",
            self.handle,
            msg
        ));
    }
}

impl<'a, H: HAL> Drop for StackFile<'a, H> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}
