//! Error types for smcopy.

use std::fmt;
use std::io;

/// Copy-endpoint operation errors.
#[derive(Debug)]
pub enum Error {
    /// A required endpoint-creation parameter was not supplied.
    MissingParam(&'static str),
    /// The local descriptor list exceeds the per-call segment cap.
    TooManySegments { count: usize, max: usize },
    /// A `process_vm_readv`/`process_vm_writev` call failed.
    ProcessVm {
        fn_name: &'static str,
        pid: libc::pid_t,
        length: usize,
        source: io::Error,
    },
    /// The KNEM inline-copy ioctl itself failed.
    KnemIoctl { status: u32, source: io::Error },
    /// The KNEM kernel module reported a failed copy in the command status.
    KnemStatus(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingParam(name) => write!(f, "missing endpoint parameter: {}", name),
            Error::TooManySegments { count, max } => {
                write!(f, "iov count {} exceeds maximum {}", count, max)
            }
            Error::ProcessVm {
                fn_name,
                pid,
                length,
                source,
            } => {
                write!(
                    f,
                    "{}(pid={}, length={}) failed: {}",
                    fn_name, pid, length, source
                )
            }
            Error::KnemIoctl { status, source } => {
                write!(
                    f,
                    "KNEM inline copy failed, copy status {}: {}",
                    status, source
                )
            }
            Error::KnemStatus(status) => {
                write!(f, "KNEM inline copy failed, copy status {}", status)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProcessVm { source, .. } => Some(source),
            Error::KnemIoctl { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for smcopy operations.
pub type Result<T> = std::result::Result<T, Error>;
