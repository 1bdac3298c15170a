//! Processor registry
//!
//! Maps processor ids to factories so the surrounding driver can select
//! its processor from configuration instead of hard-coding one. Backend
//! crates register themselves during startup:
//!
//! ```rust,ignore
//! let registry = ProcessorRegistry::new();
//! zonesync_provider_froxlor::register(&registry);
//!
//! let processor = registry.create("froxlor")?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::traits::{DomainProcessor, ProcessorFactory};

/// Registry of processor factories keyed by processor id
///
/// Uses interior mutability so registration does not require exclusive
/// access to the registry value itself.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: RwLock<HashMap<String, Box<dyn ProcessorFactory>>>,
}

impl ProcessorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor factory under `id`
    pub fn register(&self, id: impl Into<String>, factory: Box<dyn ProcessorFactory>) {
        let mut factories = self.factories.write().unwrap();
        factories.insert(id.into(), factory);
    }

    /// Instantiate the processor registered under `id`
    pub fn create(&self, id: &str) -> Result<Box<dyn DomainProcessor>> {
        let factories = self.factories.read().unwrap();
        let factory = factories
            .get(id)
            .ok_or_else(|| Error::config(format!("no processor registered with id '{id}'")))?;
        factory.create()
    }

    /// The ids of all registered processors
    pub fn ids(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap();
        factories.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoopProcessor;

    #[async_trait]
    impl DomainProcessor for NoopProcessor {
        async fn process(&mut self, _domains: &[String]) {}

        fn id(&self) -> &'static str {
            "noop"
        }
    }

    struct NoopFactory;

    impl ProcessorFactory for NoopFactory {
        fn create(&self) -> Result<Box<dyn DomainProcessor>> {
            Ok(Box::new(NoopProcessor))
        }
    }

    #[test]
    fn create_returns_registered_processor() {
        let registry = ProcessorRegistry::new();
        registry.register("noop", Box::new(NoopFactory));

        let processor = registry.create("noop").unwrap();
        assert_eq!(processor.id(), "noop");
        assert_eq!(registry.ids(), vec!["noop".to_string()]);
    }

    #[test]
    fn create_fails_for_unknown_id() {
        let registry = ProcessorRegistry::new();
        let err = registry.create("missing").err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
