//! Reconciliation cache
//!
//! Process-local state: the last-synchronized set of records, keyed by
//! fully qualified name. The cache is an explicitly owned value held by
//! the pass orchestrator; there is exactly one writer by construction and
//! nothing is persisted to disk. Restarting from an empty cache is safe,
//! the first pass simply resynchronizes everything against the remote's
//! ground truth.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::record::DomainRecord;

/// A cache slot: the record plus the time its remote state was last confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The confirmed record, `current_ip` always set
    pub record: DomainRecord,

    /// When the remote zone was last confirmed to carry this record
    pub synced_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(record: DomainRecord) -> Self {
        Self {
            record,
            synced_at: Utc::now(),
        }
    }
}

/// Outcome of diffing a requested domain set against the cache
#[derive(Debug)]
pub struct Diff {
    /// Entries already satisfied, carried forward unchanged into the next
    /// cache generation
    pub carried: ReconciliationCache,

    /// Freshly parsed records that require a remote synchronization
    pub pending: Vec<DomainRecord>,
}

/// The last-synchronized set of records, keyed by fully qualified name
#[derive(Debug, Clone, Default)]
pub struct ReconciliationCache {
    entries: HashMap<String, CacheEntry>,
}

impl ReconciliationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for a fully qualified name
    pub fn get(&self, fqn: &str) -> Option<&CacheEntry> {
        self.entries.get(fqn)
    }

    /// Whether an entry exists for a fully qualified name
    pub fn contains(&self, fqn: &str) -> bool {
        self.entries.contains_key(fqn)
    }

    /// The fully qualified names currently cached, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Insert a record confirmed against the remote zone, stamping the
    /// confirmation time. Replaces any previous entry for the same name.
    pub fn insert(&mut self, record: DomainRecord) {
        self.entries.insert(record.fqn(), CacheEntry::new(record));
    }

    /// Decide which requested domains are already satisfied and which need
    /// a remote synchronization.
    ///
    /// Every requested domain is parsed first; a parse failure aborts the
    /// whole diff (and with it the pass) leaving `self` untouched. A cached
    /// entry is carried forward only when its name matches AND its confirmed
    /// IP equals `ip`; anything else lands in `pending` as an unconfirmed
    /// record. Cached names absent from `domains` are dropped, so the
    /// carried set always reflects exactly the most recent domain set.
    pub fn diff(&self, domains: &[String], ip: Ipv4Addr) -> Result<Diff> {
        let mut carried = ReconciliationCache::new();
        let mut pending = Vec::new();

        for domain in domains {
            let record = DomainRecord::parse(domain)?;
            let fqn = record.fqn();

            match self.entries.get(&fqn) {
                Some(entry) if entry.record.current_ip == Some(ip) => {
                    carried.entries.insert(fqn, entry.clone());
                }
                _ => pending.push(record),
            }
        }

        Ok(Diff { carried, pending })
    }
}
