//! Remote keys: peer process identity and KNEM capabilities.

use bitflags::bitflags;

bitflags! {
    /// Flag bits packed into the raw CMA interface address next to the pid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IfaceAddrFlags: u32 {
        /// The peer lives outside the default pid namespace. Consumed by
        /// peer-discovery logic; the endpoint only strips it.
        const PID_NS = 1 << 31;
    }
}

/// Identity of the remote process for the direct-syscall back-end.
///
/// Captured once at endpoint creation and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteId {
    pub pid: libc::pid_t,
    pub same_namespace: bool,
}

/// Strips the flag bits from a raw interface address, separating the peer
/// pid from the namespace marker.
pub fn normalize_remote_id(raw: u32) -> RemoteId {
    let flags = IfaceAddrFlags::from_bits_truncate(raw);
    RemoteId {
        pid: (raw & !IfaceAddrFlags::all().bits()) as libc::pid_t,
        same_namespace: !flags.contains(IfaceAddrFlags::PID_NS),
    }
}

/// Capability for a KNEM-registered remote region.
///
/// The cookie is issued by the remote side's region registration; the
/// endpoint borrows it for as long as the registration is valid and never
/// releases it. Every access offset is validated against `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnemKey {
    /// Opaque registration handle understood by the kernel module.
    pub cookie: u64,
    /// Base address of the registered region in the remote address space.
    pub address: u64,
}
