//! Endpoint configuration.

use crate::iov::MAX_IOV;

/// Copy-endpoint configuration.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Maximum number of local segments accepted by a single PUT/GET call.
    /// Checked before any kernel request. May exceed [`MAX_IOV`]; the
    /// direct-syscall back-end then issues more than one batch.
    /// Default: [`MAX_IOV`].
    pub max_iov: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self { max_iov: MAX_IOV }
    }
}

impl CopyConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call segment cap.
    pub fn with_max_iov(mut self, max_iov: usize) -> Self {
        self.max_iov = max_iov;
        self
    }
}
