//! # smcopy: same-host zero-copy RMA endpoints
//!
//! Moves data directly between the virtual address spaces of two processes
//! on one host, without staging through sockets or shared-memory segments.
//! Two kernel back-ends sit behind a single PUT/GET contract:
//!
//! - **cma**: the cross-memory-attach syscalls
//!   (`process_vm_writev`/`process_vm_readv`): the endpoint drives the copy
//!   itself, batch by batch, completing partial transfers.
//! - **knem**: the KNEM kernel module: one ioctl hands the whole
//!   scatter/gather batch and a registration cookie to privileged kernel
//!   code, which merges and copies atomically.
//!
//! ## Usage
//!
//! ```ignore
//! use smcopy::{CmaEndpoint, EndpointParams, IoVec};
//!
//! let params = EndpointParams {
//!     iface_addr: Some(peer_iface_addr),
//!     ..Default::default()
//! };
//! let ep = CmaEndpoint::create(&params)?;
//! ep.put_zcopy(&[IoVec::from_slice(&data)], remote_addr, None)?;
//! ```
//!
//! Both operations are synchronous: they return only once every byte has
//! moved or the first failure occurred. A passed [`Completion`] is accepted
//! but never armed. Bytes moved before a failure stay moved; the caller must
//! treat a failed call as an indeterminate partial transfer.
//!
//! ## Architecture
//!
//! - [`iov`]: local memory descriptors and the resumable batch converter
//! - [`rkey`]: remote process identity and KNEM capabilities
//! - [`endpoint`]: the shared endpoint machine over [`CopyBackend`]
//! - [`cma`] / [`knem`]: the two kernel back-ends
//! - [`stats`]: fire-and-forget transfer counters
//! - [`config`] / [`error`]: configuration and error types

pub mod cma;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod iov;
pub mod knem;
pub mod rkey;
pub mod stats;

pub use cma::{CmaBackend, ProcessVm, VmCopy};
pub use config::CopyConfig;
pub use endpoint::{
    CmaEndpoint, Completion, CopyBackend, Endpoint, EndpointParams, KnemEndpoint, OpKind,
};
pub use error::{Error, Result};
pub use iov::{total_length, IoVec, IovIter, MAX_IOV};
pub use knem::{CopyDevice, KnemBackend, KnemDevice};
pub use rkey::{normalize_remote_id, IfaceAddrFlags, KnemKey, RemoteId};
pub use stats::TransferStats;
