//! Pass orchestration: diffing, per-record synchronization, cache merge
//!
//! One reconciliation pass:
//!
//! 1. Resolve the current public IP; a failure aborts the pass before any
//!    remote zone call.
//! 2. Diff the requested domains against the cache; a parse failure aborts
//!    the pass, the cache stays whatever it was.
//! 3. Synchronize every pending record concurrently, one task per record,
//!    joined before anything is merged.
//! 4. Merge the successful records into the carried-forward cache. Record
//!    failures never fail the pass; they are collected and logged, and the
//!    next pass retries them because the cache still lacks a confirmed
//!    entry for their names.

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::cache::{Diff, ReconciliationCache};
use crate::error::{Error, Result};
use crate::record::{DomainRecord, RECORD_TTL};
use crate::traits::{DomainProcessor, IpResolver, ZoneBackend};

/// A record-level failure, attributed to the record's name for diagnostics
#[derive(Debug)]
pub struct SyncFailure {
    /// Fully qualified name of the record that failed
    pub fqn: String,
    /// What went wrong
    pub error: Error,
}

/// Typed outcome of one reconciliation pass
#[derive(Debug, Default)]
pub struct PassReport {
    /// Records synchronized against the remote zone during this pass
    pub synced: Vec<DomainRecord>,
    /// Number of cache entries carried forward without a remote call
    pub carried: usize,
    /// Records that could not be synchronized this pass
    pub failures: Vec<SyncFailure>,
}

/// Orchestrates cache diffing, concurrent per-record synchronization and
/// cache replacement.
///
/// The reconciler owns its cache exclusively; passes run strictly one
/// after another, so no locking is needed across passes.
pub struct Reconciler {
    id: &'static str,
    backend: Arc<dyn ZoneBackend>,
    resolver: Box<dyn IpResolver>,
    cache: ReconciliationCache,
}

impl Reconciler {
    /// Create a reconciler with an empty cache
    pub fn new(
        id: &'static str,
        backend: Arc<dyn ZoneBackend>,
        resolver: Box<dyn IpResolver>,
    ) -> Self {
        Self {
            id,
            backend,
            resolver,
            cache: ReconciliationCache::new(),
        }
    }

    /// Replace the cache, e.g. to seed known-synchronized records in tests
    pub fn with_cache(mut self, cache: ReconciliationCache) -> Self {
        self.cache = cache;
        self
    }

    /// The current cache contents
    pub fn cache(&self) -> &ReconciliationCache {
        &self.cache
    }

    /// Run one full reconciliation pass over `domains`.
    ///
    /// Returns `Err` only for pass-fatal conditions (IP resolution, domain
    /// parsing), in which case the cache is left untouched. Record-level
    /// failures are reported in the returned [`PassReport`]; the partial
    /// cache update is committed regardless of how many records failed.
    pub async fn run_pass(&mut self, domains: &[String]) -> Result<PassReport> {
        let ip = self.resolver.ipv4().await?;

        let Diff { mut carried, pending } = self.cache.diff(domains, ip)?;
        let carried_count = carried.len();
        info!(
            pending = pending.len(),
            carried = carried_count,
            ip = %ip,
            "identified records requiring synchronization"
        );

        let mut tasks = JoinSet::new();
        for record in pending {
            let backend = Arc::clone(&self.backend);
            let fqn = record.fqn();
            tasks.spawn(async move {
                let outcome = synchronize_record(backend.as_ref(), record, ip).await;
                (fqn, outcome)
            });
        }

        let mut synced = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(record))) => {
                    carried.insert(record.clone());
                    synced.push(record);
                }
                Ok((fqn, Err(error))) => {
                    error!(fqn = %fqn, error = %error, "failed to synchronize record");
                    failures.push(SyncFailure { fqn, error });
                }
                Err(join_error) => {
                    // a panicking sync task loses its record until the next pass
                    error!(error = %join_error, "record synchronization task aborted");
                }
            }
        }

        self.cache = carried;

        Ok(PassReport {
            synced,
            carried: carried_count,
            failures,
        })
    }
}

#[async_trait]
impl DomainProcessor for Reconciler {
    async fn process(&mut self, domains: &[String]) {
        info!(
            processor = self.id,
            count = domains.len(),
            "processor received domains"
        );

        match self.run_pass(domains).await {
            Ok(report) => {
                info!(
                    synced = report.synced.len(),
                    carried = report.carried,
                    failed = report.failures.len(),
                    "reconciliation pass finished"
                );
            }
            Err(err) => {
                error!(error = %err, "reconciliation pass aborted");
            }
        }
    }

    fn id(&self) -> &'static str {
        self.id
    }
}

/// Make exactly one record consistent with the remote zone for `target_ip`.
///
/// The entry is looked up first, assuming there will be one or no result
/// at all. Two or more entries indicate earlier corruption of the remote
/// zone; the record is aborted without mutation and left for manual
/// cleanup. A differing entry is deleted and re-added; a failure between
/// the two leaves the zone without an entry for this name until the next
/// pass retries it.
pub async fn synchronize_record(
    backend: &dyn ZoneBackend,
    record: DomainRecord,
    target_ip: Ipv4Addr,
) -> Result<DomainRecord> {
    let fqn = record.fqn();

    ensure_domain_exists(backend, &record).await?;

    let entries = backend.find(&record.apex, &record.label).await?;

    if entries.len() > 1 {
        return Err(Error::ambiguous_zone_state(fqn, entries.len()));
    }

    let target = target_ip.to_string();

    if let Some(entry) = entries.first() {
        if entry.content == target {
            debug!(fqn = %fqn, ip = %target, entry_id = %entry.id, "zone entry already matches, no update required");
            return Ok(record.confirmed(target_ip));
        }

        // stale content, replace the entry
        backend
            .delete(&record.apex, &entry.id)
            .await
            .map_err(|err| {
                Error::zone_mutation(&fqn, format!("deleting stale entry '{}': {}", entry.id, err))
            })?;
    }

    backend
        .add(&record.apex, &record.label, &target, RECORD_TTL, "A")
        .await
        .map_err(|err| Error::zone_mutation(&fqn, format!("adding entry: {err}")))?;

    info!(fqn = %fqn, ip = %target, "updated zone entry");
    Ok(record.confirmed(target_ip))
}

/// Guarantee the registrable entity behind `record` exists remotely before
/// any zone mutation.
///
/// The system operates on behalf of a customer and can only create
/// subdomains; a missing bare apex requires administrative registration
/// and fails the record.
pub async fn ensure_domain_exists(backend: &dyn ZoneBackend, record: &DomainRecord) -> Result<()> {
    let fqn = record.fqn();

    let exists = backend
        .exists(&fqn)
        .await
        .map_err(|err| Error::existence_check(&fqn, err.to_string()))?;

    if exists {
        return Ok(());
    }

    if !record.has_subdomain() {
        return Err(Error::manual_registration_required(fqn));
    }

    info!(fqn = %fqn, "registering missing subdomain");
    backend
        .register_subdomain(&record.apex, &record.label)
        .await
        .map_err(|err| Error::subdomain_registration(&fqn, err.to_string()))
}
