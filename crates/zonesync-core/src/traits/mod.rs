//! Core traits for the zone reconciliation system
//!
//! This module defines the abstract interfaces the core consumes and the
//! one it exposes to its driver.
//!
//! - [`ZoneRepository`] / [`ExistenceChecker`]: remote zone-record backend
//! - [`IpResolver`]: public IPv4 lookup
//! - [`DomainProvider`]: hostnames currently routed by the control plane
//! - [`DomainProcessor`]: the processing interface the driver invokes

pub mod domain_provider;
pub mod ip_resolver;
pub mod processor;
pub mod zone_repository;

pub use domain_provider::DomainProvider;
pub use ip_resolver::IpResolver;
pub use processor::{DomainProcessor, ProcessorFactory};
pub use zone_repository::{ExistenceChecker, ZoneBackend, ZoneEntry, ZoneRepository};
