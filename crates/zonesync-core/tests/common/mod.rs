//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock backend defaults to an empty, all-accepting remote zone and
//! counts every interaction so tests can assert on exactly which remote
//! calls a scenario performs.

use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{ExistenceChecker, IpResolver, ZoneEntry, ZoneRepository};

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

pub fn zone_entry(id: &str, domain_id: &str, label: &str, content: &str) -> ZoneEntry {
    ZoneEntry {
        id: id.to_string(),
        domain_id: domain_id.to_string(),
        ttl: "18000".to_string(),
        label: label.to_string(),
        entry_type: "A".to_string(),
        content: content.to_string(),
    }
}

type FindFn = dyn Fn(&str, &str) -> Result<Vec<ZoneEntry>> + Send + Sync;
type AddFn = dyn Fn(&str, &str, &str) -> Result<()> + Send + Sync;
type DeleteFn = dyn Fn(&str, &str) -> Result<()> + Send + Sync;
type ExistsFn = dyn Fn(&str) -> Result<bool> + Send + Sync;
type RegisterFn = dyn Fn(&str, &str) -> Result<()> + Send + Sync;

/// A zone backend double with per-operation call counters and overridable
/// behavior
#[derive(Default)]
pub struct MockZoneBackend {
    pub find_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    added: Mutex<Vec<(String, String, String)>>,
    deleted: Mutex<Vec<String>>,
    find_fn: Option<Box<FindFn>>,
    add_fn: Option<Box<AddFn>>,
    delete_fn: Option<Box<DeleteFn>>,
    exists_fn: Option<Box<ExistsFn>>,
    register_fn: Option<Box<RegisterFn>>,
}

impl MockZoneBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_find(
        mut self,
        f: impl Fn(&str, &str) -> Result<Vec<ZoneEntry>> + Send + Sync + 'static,
    ) -> Self {
        self.find_fn = Some(Box::new(f));
        self
    }

    pub fn with_add(
        mut self,
        f: impl Fn(&str, &str, &str) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.add_fn = Some(Box::new(f));
        self
    }

    pub fn with_delete(
        mut self,
        f: impl Fn(&str, &str) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.delete_fn = Some(Box::new(f));
        self
    }

    pub fn with_exists(
        mut self,
        f: impl Fn(&str) -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.exists_fn = Some(Box::new(f));
        self
    }

    pub fn with_register(
        mut self,
        f: impl Fn(&str, &str) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.register_fn = Some(Box::new(f));
        self
    }

    /// The `(apex, label, content)` triples passed to `add`, in call order
    pub fn added(&self) -> Vec<(String, String, String)> {
        self.added.lock().unwrap().clone()
    }

    /// The entry ids passed to `delete`, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn find_count(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn add_count(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn exists_count(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn register_count(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneRepository for MockZoneBackend {
    async fn find(&self, apex: &str, label: &str) -> Result<Vec<ZoneEntry>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        match &self.find_fn {
            Some(f) => f(apex, label),
            None => Ok(Vec::new()),
        }
    }

    async fn add(
        &self,
        apex: &str,
        label: &str,
        content: &str,
        _ttl: u32,
        _entry_type: &str,
    ) -> Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.added
            .lock()
            .unwrap()
            .push((apex.to_string(), label.to_string(), content.to_string()));
        match &self.add_fn {
            Some(f) => f(apex, label, content),
            None => Ok(()),
        }
    }

    async fn delete(&self, apex: &str, entry_id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().unwrap().push(entry_id.to_string());
        match &self.delete_fn {
            Some(f) => f(apex, entry_id),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExistenceChecker for MockZoneBackend {
    async fn exists(&self, fqn: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        match &self.exists_fn {
            Some(f) => f(fqn),
            None => Ok(true),
        }
    }

    async fn register_subdomain(&self, apex: &str, label: &str) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match &self.register_fn {
            Some(f) => f(apex, label),
            None => Ok(()),
        }
    }
}

/// An IP resolver that always answers with the same address
pub struct StaticIpResolver(pub Ipv4Addr);

#[async_trait]
impl IpResolver for StaticIpResolver {
    async fn ipv4(&self) -> Result<Ipv4Addr> {
        Ok(self.0)
    }
}

/// An IP resolver that always fails
pub struct FailingIpResolver;

#[async_trait]
impl IpResolver for FailingIpResolver {
    async fn ipv4(&self) -> Result<Ipv4Addr> {
        Err(Error::ip_resolution("ip lookup error"))
    }
}
