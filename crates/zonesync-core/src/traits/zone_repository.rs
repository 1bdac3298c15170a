//! Zone-record backend traits
//!
//! The core depends only on these abstractions; concrete adapters (the
//! Froxlor HTTP adapter, in-memory fakes for tests) implement them. Both
//! capability sets are usually backed by the same remote control panel,
//! which is what the [`ZoneBackend`] supertrait expresses.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// One DNS resource record as projected by the remote control panel.
///
/// Field values are kept as strings because that is how the remote
/// represents them; the core never interprets anything but `content`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneEntry {
    /// Entry identifier, used for deletion
    pub id: String,

    /// Identifier of the parent domain
    pub domain_id: String,

    /// Time to live of the entry
    pub ttl: String,

    /// Subdomain label the entry belongs to (`@` for the apex)
    #[serde(rename = "record")]
    pub label: String,

    /// Record type, e.g. `A`
    #[serde(rename = "type")]
    pub entry_type: String,

    /// Record content; an IP address for the entries this system manages
    pub content: String,
}

/// Capability set for looking up and mutating zone entries
///
/// Implementations must be thread-safe and usable across async tasks.
/// They perform single-shot remote calls and leave retry to the
/// reconciliation loop: a failed mutation is simply re-attempted on the
/// next pass because the cache still treats the record as unconfirmed.
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Look up all zone entries for `(apex, label)`.
    ///
    /// A healthy zone yields zero or one entry; callers treat more than
    /// one as corruption of the remote state.
    async fn find(&self, apex: &str, label: &str) -> Result<Vec<ZoneEntry>>;

    /// Create a zone entry for `(apex, label)` pointing at `content`
    async fn add(
        &self,
        apex: &str,
        label: &str,
        content: &str,
        ttl: u32,
        entry_type: &str,
    ) -> Result<()>;

    /// Delete the zone entry identified by `entry_id` under `apex`
    async fn delete(&self, apex: &str, entry_id: &str) -> Result<()>;
}

/// Capability set for ensuring the registrable entity behind a record exists
#[async_trait]
pub trait ExistenceChecker: Send + Sync {
    /// Whether the fully qualified name is known to the remote system
    async fn exists(&self, fqn: &str) -> Result<bool>;

    /// Register `label` as a subdomain of `apex`
    async fn register_subdomain(&self, apex: &str, label: &str) -> Result<()>;
}

/// Combined backend the reconciler talks to: zone entries plus existence
pub trait ZoneBackend: ZoneRepository + ExistenceChecker {}

impl<T: ZoneRepository + ExistenceChecker> ZoneBackend for T {}
