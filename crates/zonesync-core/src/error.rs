//! Error types for the zone reconciliation system.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zone reconciliation system
///
/// Severity is positional, not encoded here: `MalformedDomain` and
/// `IpResolution` abort a whole pass when they occur during diffing, while
/// the zone-level variants only fail the record they belong to.
#[derive(Error, Debug)]
pub enum Error {
    /// Input hostname cannot be split into a registrable apex and label
    #[error("domain '{0}' is malformed")]
    MalformedDomain(String),

    /// The public IP provider was unreachable or returned an unusable response
    #[error("failed to resolve public IPv4 address: {0}")]
    IpResolution(String),

    /// The remote zone holds more than one entry for a single name.
    /// This indicates earlier corruption of the remote state and is
    /// surfaced for manual cleanup, never auto-repaired.
    #[error("lookup returned {count} zone entries for '{fqn}', please verify manually")]
    AmbiguousZoneState {
        /// Fully qualified name of the affected record
        fqn: String,
        /// Number of entries the lookup returned
        count: usize,
    },

    /// A zone add or delete failed, possibly leaving the remote zone without
    /// an entry for this name until a later pass retries it
    #[error("zone mutation failed for '{fqn}': {reason}")]
    ZoneMutation {
        /// Fully qualified name of the affected record
        fqn: String,
        /// What went wrong, including the underlying remote error
        reason: String,
    },

    /// A bare apex is missing remotely; registrable domains can only be
    /// created through administrative action, not by this system
    #[error("domain '{0}' does not exist and has no subdomain label that could be registered")]
    ManualRegistrationRequired(String),

    /// The remote existence lookup itself failed
    #[error("existence check failed for '{fqn}': {reason}")]
    ExistenceCheck {
        /// Fully qualified name that was checked
        fqn: String,
        /// Underlying remote error
        reason: String,
    },

    /// Registering a missing subdomain failed remotely
    #[error("subdomain registration failed for '{fqn}': {reason}")]
    SubdomainRegistration {
        /// Fully qualified name that was being registered
        fqn: String,
        /// Underlying remote error
        reason: String,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport errors from remote backends
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed-domain error
    pub fn malformed_domain(domain: impl Into<String>) -> Self {
        Self::MalformedDomain(domain.into())
    }

    /// Create an IP resolution error
    pub fn ip_resolution(msg: impl Into<String>) -> Self {
        Self::IpResolution(msg.into())
    }

    /// Create an ambiguous-zone-state error
    pub fn ambiguous_zone_state(fqn: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousZoneState {
            fqn: fqn.into(),
            count,
        }
    }

    /// Create a zone mutation error
    pub fn zone_mutation(fqn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ZoneMutation {
            fqn: fqn.into(),
            reason: reason.into(),
        }
    }

    /// Create a manual-registration-required error
    pub fn manual_registration_required(fqn: impl Into<String>) -> Self {
        Self::ManualRegistrationRequired(fqn.into())
    }

    /// Create an existence check error
    pub fn existence_check(fqn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExistenceCheck {
            fqn: fqn.into(),
            reason: reason.into(),
        }
    }

    /// Create a subdomain registration error
    pub fn subdomain_registration(fqn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SubdomainRegistration {
            fqn: fqn.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
