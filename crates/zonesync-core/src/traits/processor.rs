//! Domain processor trait
//!
//! The interface the scheduling driver sees. `process` is deliberately
//! infallible at this boundary: every failure is logged with the affected
//! record's name and handled by a later pass re-attempting the same work.
//! The typed pass results stay available one layer below, on the concrete
//! reconciler, so tests can assert on them directly.

use async_trait::async_trait;

use crate::error::Result;

/// A processor works on a list of domains and identifies itself via an id
#[async_trait]
pub trait DomainProcessor: Send {
    /// Run one reconciliation pass over `domains`
    async fn process(&mut self, domains: &[String]);

    /// Static capability tag used for processor selection by the driver
    fn id(&self) -> &'static str;
}

/// Helper trait for constructing processors from their environment
pub trait ProcessorFactory: Send + Sync {
    /// Create a processor instance, wiring up its remote collaborators
    fn create(&self) -> Result<Box<dyn DomainProcessor>>;
}
