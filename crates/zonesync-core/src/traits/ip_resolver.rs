//! IP resolver trait

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::Result;

/// Trait for resolving the caller's current public IPv4 address
///
/// Implementations typically ask a third-party HTTP service. Failures are
/// pass-fatal for the reconciler: no remote zone call is made without a
/// resolved target IP.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IPv4 address
    async fn ipv4(&self) -> Result<Ipv4Addr>;
}
