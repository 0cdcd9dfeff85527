//! Fire-and-forget transfer counters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::endpoint::OpKind;

/// Per-endpoint operation counters.
///
/// Updated after every operation and readable by the enclosing framework at
/// any time; recording never affects control flow.
#[derive(Debug, Default)]
pub struct TransferStats {
    put_ops: AtomicU64,
    put_bytes: AtomicU64,
    get_ops: AtomicU64,
    get_bytes: AtomicU64,
    errors: AtomicU64,
}

impl TransferStats {
    pub(crate) fn record(&self, op: OpKind, bytes: usize) {
        let (ops, total) = match op {
            OpKind::Put => (&self.put_ops, &self.put_bytes),
            OpKind::Get => (&self.get_ops, &self.get_bytes),
        };
        ops.fetch_add(1, Ordering::Relaxed);
        total.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn put_ops(&self) -> u64 {
        self.put_ops.load(Ordering::Relaxed)
    }

    pub fn put_bytes(&self) -> u64 {
        self.put_bytes.load(Ordering::Relaxed)
    }

    pub fn get_ops(&self) -> u64 {
        self.get_ops.load(Ordering::Relaxed)
    }

    pub fn get_bytes(&self) -> u64 {
        self.get_bytes.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}
