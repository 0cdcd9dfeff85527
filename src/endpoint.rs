//! The shared copy-endpoint machine over the two kernel back-ends.

use std::os::fd::RawFd;

use crate::cma::CmaBackend;
use crate::config::CopyConfig;
use crate::error::{Error, Result};
use crate::iov::{total_length, IoVec};
use crate::knem::{KnemBackend, KnemDevice};
use crate::rkey::{normalize_remote_id, KnemKey};
use crate::stats::TransferStats;

/// Direction of a zero-copy operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Write local data into the remote region.
    Put,
    /// Read remote data into local buffers.
    Get,
}

/// Asynchronous completion handle.
///
/// Accepted for signature compatibility with asynchronous transports, and
/// reserved: both back-ends finish synchronously, so by the time an
/// operation returns it is fully resolved and the handle has never been
/// armed. No deferred notification is ever produced.
#[derive(Debug, Default)]
pub struct Completion {
    /// Number of outstanding operations the caller tracks against this
    /// handle.
    pub count: u32,
}

/// The seam between the shared endpoint machine and a kernel copy facility.
pub trait CopyBackend {
    /// Moves the whole description in the `op` direction, returning only
    /// once every byte has been transferred or the first failure occurred.
    /// Bytes moved before a failure stay moved.
    fn dispatch(&self, iov: &[IoVec], remote_addr: u64, op: OpKind) -> Result<()>;
}

/// Connection parameters supplied by the transport layer when an endpoint
/// is established. Each back-end requires its own subset; a missing
/// required field is an invalid-argument error at creation.
#[derive(Debug, Clone, Default)]
pub struct EndpointParams {
    /// Raw CMA interface address of the peer: pid plus flag bits.
    pub iface_addr: Option<u32>,
    /// Capability for the peer's KNEM-registered region.
    pub rkey: Option<KnemKey>,
    /// Endpoint configuration.
    pub config: CopyConfig,
}

/// A same-host RMA endpoint bound to one remote peer.
///
/// Owns the back-end (which holds the single remote key fixed at creation)
/// and no other mutable state; the stats counters are atomic, so concurrent
/// reads of the endpoint are safe. Serializing concurrent operations on one
/// endpoint is the caller's responsibility.
#[derive(Debug)]
pub struct Endpoint<B> {
    backend: B,
    config: CopyConfig,
    stats: TransferStats,
}

impl<B: CopyBackend> Endpoint<B> {
    pub fn new(backend: B, config: CopyConfig) -> Self {
        Self {
            backend,
            config,
            stats: TransferStats::default(),
        }
    }

    /// Writes the local description into the remote region at `remote_addr`.
    ///
    /// On success exactly the total local length has been copied, in strict
    /// left-to-right segment order. On failure, bytes already transferred
    /// remain transferred; the caller must assume an indeterminate partial
    /// transfer. `_comp` is reserved and never armed.
    pub fn put_zcopy(
        &self,
        iov: &[IoVec],
        remote_addr: u64,
        _comp: Option<&mut Completion>,
    ) -> Result<()> {
        self.zcopy(iov, remote_addr, OpKind::Put)
    }

    /// Reads the remote region at `remote_addr` into the local description.
    ///
    /// Same contract as [`Endpoint::put_zcopy`] with the direction reversed.
    pub fn get_zcopy(
        &self,
        iov: &[IoVec],
        remote_addr: u64,
        _comp: Option<&mut Completion>,
    ) -> Result<()> {
        self.zcopy(iov, remote_addr, OpKind::Get)
    }

    fn zcopy(&self, iov: &[IoVec], remote_addr: u64, op: OpKind) -> Result<()> {
        let res = if iov.len() > self.config.max_iov {
            Err(Error::TooManySegments {
                count: iov.len(),
                max: self.config.max_iov,
            })
        } else {
            self.backend.dispatch(iov, remote_addr, op)
        };
        match &res {
            Ok(()) => self.stats.record(op, total_length(iov)),
            Err(_) => self.stats.record_error(),
        }
        res
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Endpoint over the direct cross-memory-attach syscalls.
pub type CmaEndpoint = Endpoint<CmaBackend>;

impl CmaEndpoint {
    /// Creates a direct-syscall endpoint from connection parameters.
    ///
    /// `iface_addr` is required; its flag bits are stripped once here and
    /// the bare pid is kept for the endpoint's lifetime.
    pub fn create(params: &EndpointParams) -> Result<Self> {
        let raw = params
            .iface_addr
            .ok_or(Error::MissingParam("iface_addr"))?;
        Ok(Endpoint::new(
            CmaBackend::new(normalize_remote_id(raw)),
            params.config.clone(),
        ))
    }
}

/// Endpoint over the KNEM kernel module.
pub type KnemEndpoint = Endpoint<KnemBackend>;

impl KnemEndpoint {
    /// Creates a kernel-module endpoint from connection parameters.
    ///
    /// `device` is a pre-opened KNEM device handle owned by the memory
    /// domain that holds the registration; the endpoint borrows it for its
    /// lifetime and never closes it. `rkey` is required.
    pub fn create(device: RawFd, params: &EndpointParams) -> Result<Self> {
        let key = params.rkey.ok_or(Error::MissingParam("rkey"))?;
        Ok(Endpoint::new(
            KnemBackend::new(KnemDevice::new(device), key),
            params.config.clone(),
        ))
    }
}
