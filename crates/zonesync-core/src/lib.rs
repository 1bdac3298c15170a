// # zonesync-core
//
// Core library for keeping DNS zone records synchronized with the set of
// hostnames currently routed by a reverse-proxy control plane, using the
// host's own public IPv4 address as the target.
//
// ## Architecture Overview
//
// - **DomainRecord**: one DNS entry to manage (apex or subdomain) and its
//   last-known IP, parsed from raw hostnames via the public suffix list
// - **ReconciliationCache**: the last-synchronized record set, diffed
//   against each new domain set so repeated passes are idempotent and cheap
// - **Reconciler**: orchestrates diffing, concurrent per-record
//   synchronization against the remote zone and cache replacement
// - **ZoneRepository / ExistenceChecker / IpResolver / DomainProvider**:
//   trait seams for the remote collaborators; the core depends only on the
//   abstractions
// - **ProcessorRegistry**: id-keyed factories so the driver selects its
//   processor from configuration
//
// ## Design Principles
//
// 1. **Single writer**: the cache is owned by the reconciler, no global
//    mutable state anywhere
// 2. **Structured concurrency**: one task per record, joined before the
//    cache is replaced
// 3. **Self-healing over rollback**: failed mutations are never rolled
//    back; the next pass retries whatever is still unconfirmed

pub mod cache;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use cache::{CacheEntry, Diff, ReconciliationCache};
pub use error::{Error, Result};
pub use reconciler::{PassReport, Reconciler, SyncFailure, ensure_domain_exists, synchronize_record};
pub use record::{APEX_LABEL, DomainRecord, RECORD_TTL};
pub use registry::ProcessorRegistry;
pub use traits::{
    DomainProcessor, DomainProvider, ExistenceChecker, IpResolver, ProcessorFactory, ZoneBackend,
    ZoneEntry, ZoneRepository,
};
