//! Configuration types for the contacts layer
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::schema::AuthStatus;
use crate::store::DEFAULT_CHANGE_FEED_CAPACITY;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// Contact store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Change listener settings
    #[serde(default)]
    pub listener: ListenerConfig,
}

impl ContactsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.listener.validate()?;
        Ok(())
    }
}

/// Contact store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    Memory {
        /// Authorization status the store starts in
        #[serde(default = "default_authorization")]
        authorization: AuthStatus,

        /// Unread change payloads buffered per feed subscriber
        ///
        /// Default: 256 payloads
        #[serde(default = "default_change_feed_capacity")]
        change_feed_capacity: usize,
    },

    /// Host-provided store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Memory {
                change_feed_capacity,
                ..
            } => {
                if *change_feed_capacity == 0 {
                    return Err(crate::Error::config(
                        "Memory store change feed capacity must be > 0",
                    ));
                }
                Ok(())
            }
            StoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom store factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom store config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::Memory { .. } => "memory",
            StoreConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory {
            authorization: default_authorization(),
            change_feed_capacity: default_change_feed_capacity(),
        }
    }
}

/// Change listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Capacity of the fan-out channel feeding local observers
    ///
    /// An observer that falls this far behind skips the oldest events
    /// (with a warning log) instead of stalling the others.
    ///
    /// Default: 256 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ListenerConfig {
    /// Validate the listener configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Listener event channel capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_authorization() -> AuthStatus {
    AuthStatus::Authorized
}

fn default_change_feed_capacity() -> usize {
    DEFAULT_CHANGE_FEED_CAPACITY
}

fn default_event_channel_capacity() -> usize {
    256
}
