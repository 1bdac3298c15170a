//! Record model and domain-string parsing
//!
//! A [`DomainRecord`] is the unit the reconciler manages: one DNS name
//! (apex or subdomain) together with the IP believed to be live in the
//! remote zone for it. Records are constructed fresh from raw hostname
//! strings at the start of every reconciliation pass.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Label sentinel meaning "the apex itself" (no subdomain)
pub const APEX_LABEL: &str = "@";

/// Time to live, in seconds, for every zone entry created by the
/// synchronizer. A policy value, not configurable per record.
pub const RECORD_TTL: u32 = 18_000;

/// One DNS entry to manage and its last-known IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// The registrable top-level domain, e.g. `example.com`
    pub apex: String,

    /// The subdomain label, or [`APEX_LABEL`] for the apex itself
    pub label: String,

    /// IP believed to be live in the remote zone for this record.
    /// `None` means the record has never been confirmed synchronized
    /// and must be resynchronized before being trusted.
    pub current_ip: Option<Ipv4Addr>,
}

impl DomainRecord {
    /// Create an unconfirmed record. An empty label is normalized to the
    /// apex sentinel.
    pub fn new(apex: impl Into<String>, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let label = if label.is_empty() {
            APEX_LABEL.to_string()
        } else {
            label
        };

        Self {
            apex: apex.into(),
            label,
            current_ip: None,
        }
    }

    /// Split a raw hostname string into a registrable apex and an optional
    /// subdomain label, using public-suffix-aware parsing.
    ///
    /// Fails with [`Error::MalformedDomain`] when no registrable apex can
    /// be extracted (e.g. a bare label such as `"foo--"`).
    pub fn parse(domain: &str) -> Result<Self> {
        let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

        let apex = psl::domain_str(&normalized)
            .ok_or_else(|| Error::malformed_domain(domain))?
            .to_string();

        let label = normalized
            .strip_suffix(apex.as_str())
            .map(|prefix| prefix.trim_end_matches('.'))
            .unwrap_or_default()
            .to_string();

        Ok(Self::new(apex, label))
    }

    /// The fully qualified name: `label.apex`, or just the apex when the
    /// record has no subdomain.
    pub fn fqn(&self) -> String {
        if self.has_subdomain() {
            format!("{}.{}", self.label, self.apex)
        } else {
            self.apex.clone()
        }
    }

    /// Whether the record points at a subdomain rather than the bare apex
    pub fn has_subdomain(&self) -> bool {
        !self.label.is_empty() && self.label != APEX_LABEL
    }

    /// Return this record stamped as carrying `ip` in the remote zone
    pub fn confirmed(mut self, ip: Ipv4Addr) -> Self {
        self.current_ip = Some(ip);
        self
    }
}

impl fmt::Display for DomainRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}
