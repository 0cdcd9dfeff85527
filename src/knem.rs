//! Kernel-module back-end: batched PUT/GET through the KNEM inline-copy
//! ioctl.
//!
//! The scatter/gather batch, the registration cookie, and the offset into
//! the registered region go to the kernel in one request; the module merges
//! and copies atomically, so a request either completes in full or fails in
//! full and no partial-completion handling exists here.

use std::io;
use std::os::fd::RawFd;

use crate::endpoint::{CopyBackend, OpKind};
use crate::error::{Error, Result};
use crate::iov::{fill_sg, IoVec, IovIter, SgEntry, MAX_IOV};
use crate::rkey::KnemKey;

pub const KNEM_STATUS_PENDING: u32 = 0;
pub const KNEM_STATUS_SUCCESS: u32 = 1;
pub const KNEM_STATUS_FAILED: u32 = 2;

/// Scatter/gather element of the KNEM command ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnemIovec {
    pub base: u64,
    pub len: u64,
}

impl SgEntry for KnemIovec {
    fn new(base: *mut u8, len: usize) -> Self {
        Self {
            base: base as u64,
            len: len as u64,
        }
    }
}

/// The `KNEM_CMD_INLINE_COPY` command block.
///
/// `current_status` is filled in by the kernel; everything else is input.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct KnemInlineCopy {
    pub local_iovec_array: u64,
    pub local_iovec_nr: u32,
    /// 0 reads from the remote region into the local segments, 1 writes to
    /// the remote region from the local segments.
    pub write: u32,
    pub remote_cookie: u64,
    pub remote_offset: u64,
    pub flags: u32,
    pub async_status_index: u32,
    pub current_status: u32,
    pub pad: u32,
}

mod ioc {
    use super::KnemInlineCopy;

    nix::ioctl_readwrite!(knem_inline_copy, b'k', 0x4, KnemInlineCopy);
}

/// The kernel request primitive behind the back-end; mockable.
pub trait CopyDevice {
    fn inline_copy(&self, cmd: &mut KnemInlineCopy) -> nix::Result<()>;
}

/// A pre-opened KNEM character-device handle.
///
/// The descriptor is owned by the memory domain that issued the
/// registration; this wrapper borrows it for the endpoint's lifetime and
/// never opens, closes, or validates it.
#[derive(Debug, Clone, Copy)]
pub struct KnemDevice {
    fd: RawFd,
}

impl KnemDevice {
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }
}

impl CopyDevice for KnemDevice {
    fn inline_copy(&self, cmd: &mut KnemInlineCopy) -> nix::Result<()> {
        unsafe { ioc::knem_inline_copy(self.fd, cmd) }.map(drop)
    }
}

/// Kernel-module copy back-end bound to one registered remote region.
#[derive(Debug)]
pub struct KnemBackend<D: CopyDevice = KnemDevice> {
    key: KnemKey,
    device: D,
}

impl KnemBackend {
    pub fn new(device: KnemDevice, key: KnemKey) -> Self {
        Self { key, device }
    }
}

impl<D: CopyDevice> KnemBackend<D> {
    /// Back-end with a custom request primitive.
    pub fn with_device(device: D, key: KnemKey) -> Self {
        Self { key, device }
    }

    pub fn key(&self) -> KnemKey {
        self.key
    }
}

impl<D: CopyDevice> CopyBackend for KnemBackend<D> {
    fn dispatch(&self, iov: &[IoVec], remote_addr: u64, op: OpKind) -> Result<()> {
        let mut iter = IovIter::new();
        let mut remote_base = remote_addr;

        // A description of up to MAX_IOV segments (the configured default)
        // goes to the kernel as a single all-or-nothing request; a wider cap
        // yields consecutive requests over consecutive remote ranges.
        while iter.iov_index < iov.len() {
            let mut batch = [KnemIovec { base: 0, len: 0 }; MAX_IOV];
            let (cnt, len) = fill_sg(&mut batch, iov, usize::MAX, &mut iter);
            if cnt == 0 {
                continue;
            }

            assert!(
                remote_base >= self.key.address,
                "remote address {:#x} below registered base {:#x}",
                remote_base,
                self.key.address
            );

            let mut cmd = KnemInlineCopy {
                local_iovec_array: batch.as_ptr() as u64,
                local_iovec_nr: cnt as u32,
                write: match op {
                    OpKind::Put => 1,
                    OpKind::Get => 0,
                },
                remote_cookie: self.key.cookie,
                remote_offset: remote_base - self.key.address,
                flags: 0,
                async_status_index: 0,
                current_status: 0,
                pad: 0,
            };

            match self.device.inline_copy(&mut cmd) {
                Err(errno) => {
                    return Err(Error::KnemIoctl {
                        status: cmd.current_status,
                        source: io::Error::from_raw_os_error(errno as i32),
                    })
                }
                Ok(()) if cmd.current_status != KNEM_STATUS_SUCCESS => {
                    return Err(Error::KnemStatus(cmd.current_status));
                }
                Ok(()) => {}
            }

            remote_base += len as u64;
        }

        Ok(())
    }
}
