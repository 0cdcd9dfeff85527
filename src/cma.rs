//! Direct-syscall back-end: cross-memory-attach PUT/GET via
//! `process_vm_writev`/`process_vm_readv`.
//!
//! The endpoint drives the copy itself. The local description is sliced into
//! batches of at most [`MAX_IOV`] entries; each batch addresses one
//! contiguous remote range, and because the kernel may transfer fewer bytes
//! than requested in one invocation, the batch is driven to completion by an
//! inner loop that advances both cursors by the bytes actually moved.

use std::io;
use std::ptr;

use crate::endpoint::{CopyBackend, OpKind};
use crate::error::{Error, Result};
use crate::iov::{fill_sg, iovec_advance, IoVec, IovIter, MAX_IOV};
use crate::rkey::RemoteId;

/// The copy primitive behind the back-end: transfers between a local iovec
/// batch and a single remote region, possibly stopping short of the request.
pub trait VmCopy {
    fn copy(
        &self,
        pid: libc::pid_t,
        local: &[libc::iovec],
        remote: &libc::iovec,
        op: OpKind,
    ) -> io::Result<usize>;
}

/// Production primitive: the raw syscalls, `flags = 0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessVm;

impl VmCopy for ProcessVm {
    fn copy(
        &self,
        pid: libc::pid_t,
        local: &[libc::iovec],
        remote: &libc::iovec,
        op: OpKind,
    ) -> io::Result<usize> {
        let ret = unsafe {
            match op {
                OpKind::Put => libc::process_vm_writev(
                    pid,
                    local.as_ptr(),
                    local.len() as libc::c_ulong,
                    remote,
                    1,
                    0,
                ),
                OpKind::Get => libc::process_vm_readv(
                    pid,
                    local.as_ptr(),
                    local.len() as libc::c_ulong,
                    remote,
                    1,
                    0,
                ),
            }
        };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ret as usize)
        }
    }
}

fn syscall_name(op: OpKind) -> &'static str {
    match op {
        OpKind::Put => "process_vm_writev",
        OpKind::Get => "process_vm_readv",
    }
}

/// Direct-syscall copy back-end bound to one remote process.
#[derive(Debug)]
pub struct CmaBackend<V: VmCopy = ProcessVm> {
    remote: RemoteId,
    vm: V,
}

impl CmaBackend {
    pub fn new(remote: RemoteId) -> Self {
        Self {
            remote,
            vm: ProcessVm,
        }
    }
}

impl<V: VmCopy> CmaBackend<V> {
    /// Back-end with a custom copy primitive.
    pub fn with_primitive(remote: RemoteId, vm: V) -> Self {
        Self { remote, vm }
    }

    pub fn remote_id(&self) -> RemoteId {
        self.remote
    }

    /// Drives one batch to completion against one contiguous remote range.
    fn drive(
        &self,
        local: &mut [libc::iovec],
        remote: &mut libc::iovec,
        op: OpKind,
    ) -> Result<()> {
        let mut local_idx = 0;
        let mut remote_idx = 0;

        while remote.iov_len > 0 {
            let ret = self
                .vm
                .copy(self.remote.pid, &local[local_idx..], remote, op)
                .map_err(|source| Error::ProcessVm {
                    fn_name: syscall_name(op),
                    pid: self.remote.pid,
                    length: remote.iov_len,
                    source,
                })?;
            assert!(
                ret <= remote.iov_len,
                "kernel reported {} bytes for a {} byte request",
                ret,
                remote.iov_len
            );
            iovec_advance(local, &mut local_idx, ret);
            iovec_advance(std::slice::from_mut(remote), &mut remote_idx, ret);
        }

        Ok(())
    }
}

impl<V: VmCopy> CopyBackend for CmaBackend<V> {
    fn dispatch(&self, iov: &[IoVec], remote_addr: u64, op: OpKind) -> Result<()> {
        let mut iter = IovIter::new();
        let mut remote_base = remote_addr;

        while iter.iov_index < iov.len() {
            let mut batch = [libc::iovec {
                iov_base: ptr::null_mut(),
                iov_len: 0,
            }; MAX_IOV];
            let (cnt, len) = fill_sg(&mut batch, iov, usize::MAX, &mut iter);
            if len == 0 {
                continue;
            }

            let mut remote = libc::iovec {
                iov_base: remote_base as *mut libc::c_void,
                iov_len: len,
            };
            self.drive(&mut batch[..cnt], &mut remote, op)?;
            remote_base += len as u64;
        }

        Ok(())
    }
}
