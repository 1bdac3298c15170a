//! Domain provider trait

use async_trait::async_trait;

/// Trait for components that know which hostnames are currently routed
///
/// The canonical implementation queries a reverse-proxy control plane and
/// extracts hostnames from its route-matching rules. Lookup failures are
/// handled and logged inside the provider; callers only ever observe a
/// (possibly empty) deduplicated list.
#[async_trait]
pub trait DomainProvider: Send + Sync {
    /// The deduplicated hostnames currently routed, order irrelevant
    async fn domains(&self) -> Vec<String>;
}
