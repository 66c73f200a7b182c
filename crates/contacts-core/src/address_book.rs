//! Session object tying the dispatcher and the change listener together
//!
//! One `AddressBook` per process (or per host session) replaces the
//! module-level listener singleton: whoever owns the book owns the single
//! change subscription, and dropping it cancels that subscription.

use std::sync::Arc;

use crate::config::ContactsConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::Result;
use crate::listener::ChangeListenerBridge;
use crate::registry::StoreRegistry;
use crate::traits::ContactStore;

/// Dispatcher and listener bridge over one store
#[derive(Debug)]
pub struct AddressBook {
    dispatcher: CommandDispatcher,
    listener: ChangeListenerBridge,
}

impl AddressBook {
    /// Build over an already constructed store
    pub fn new(store: Arc<dyn ContactStore>, config: &ContactsConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            dispatcher: CommandDispatcher::new(Arc::clone(&store)),
            listener: ChangeListenerBridge::new(store, &config.listener),
        })
    }

    /// Build with the store the configuration names
    pub fn from_registry(registry: &StoreRegistry, config: &ContactsConfig) -> Result<Self> {
        let store = registry.create_store(&config.store)?;
        Self::new(store, config)
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn listener(&self) -> &ChangeListenerBridge {
        &self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListenerConfig;

    #[test]
    fn builds_from_builtin_registry() {
        let book =
            AddressBook::from_registry(&StoreRegistry::with_builtin(), &ContactsConfig::default())
                .unwrap();
        assert_eq!(book.dispatcher().store().store_name(), "memory");
        assert!(!book.listener().is_listening());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ContactsConfig {
            listener: ListenerConfig {
                event_channel_capacity: 0,
            },
            ..ContactsConfig::default()
        };
        assert!(AddressBook::from_registry(&StoreRegistry::with_builtin(), &config).is_err());
    }
}
