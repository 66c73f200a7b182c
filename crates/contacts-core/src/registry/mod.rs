//! Plugin-based store registry
//!
//! Host bindings register a [`ContactStoreFactory`] under a type name; the
//! configured [`StoreConfig`] then picks one at startup without hardcoded
//! if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contacts_core::registry::StoreRegistry;
//! use contacts_core::config::StoreConfig;
//!
//! let registry = StoreRegistry::with_builtin();
//! registry.register_store("native", Box::new(NativeStoreFactory));
//!
//! let store = registry.create_store(&StoreConfig::default())?;
//! ```

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::store::MemoryContactStoreFactory;
use crate::traits::{ContactStore, ContactStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of contact store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Box<dyn ContactStoreFactory>>>,
}

impl StoreRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the stores shipped in this crate
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryContactStoreFactory));
        registry
    }

    /// Register a contact store factory
    ///
    /// Registering an existing name replaces the previous factory.
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn ContactStoreFactory>) {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        stores.insert(name.into(), factory);
    }

    /// Create a contact store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn ContactStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub fn create_store(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
        config.validate()?;

        let store_type = config.type_name();
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);

        let factory = stores
            .get(store_type)
            .ok_or_else(|| Error::config(format!("Unknown store type: {}", store_type)))?;

        factory.create(config)
    }

    /// List all registered store types
    pub fn list_stores(&self) -> Vec<String> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.keys().cloned().collect()
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.contains_key(name)
    }
}
