//! Change listener bridge
//!
//! The store exposes a single raw change channel. The bridge guards it with
//! a two-state machine and republishes every raw payload to any number of
//! local observers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  watch_changes()  ┌────────────────┐  broadcast  ┌────────────┐
//! │ ContactStore │ ────────────────▶ │ forwarding task│ ──────────▶ │ observer 1 │
//! └──────────────┘   (one stream)    └────────────────┘      │      └────────────┘
//!                                                            └────▶ │ observer N │
//! ```
//!
//! ## Lifecycle
//!
//! `Idle` ─ `setup()` ─▶ `Active` ─ `remove()` ─▶ `Idle`
//!
//! Both transitions check and switch the state under one lock, so two
//! concurrent `setup()` calls can never both succeed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::ListenerConfig;
use crate::error::{Error, Result};
use crate::traits::ContactStore;

/// Name of the event republished for every raw change
pub const CONTACT_CHANGED: &str = "contact-changed";

/// A republished change notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactChangedEvent {
    /// Always [`CONTACT_CHANGED`]
    pub event: &'static str,
    /// Store-defined payload, forwarded verbatim
    pub payload: Value,
    /// When the bridge received the raw notification
    pub received_at: DateTime<Utc>,
}

impl ContactChangedEvent {
    pub fn new(payload: Value) -> Self {
        Self {
            event: CONTACT_CHANGED,
            payload,
            received_at: Utc::now(),
        }
    }
}

/// Lifecycle state of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Active,
}

/// Single-slot subscription to the store's change feed
///
/// Dropping the bridge cancels an active subscription.
pub struct ChangeListenerBridge {
    store: Arc<dyn ContactStore>,
    events: broadcast::Sender<ContactChangedEvent>,
    /// `Some` exactly while `Active`
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeListenerBridge {
    /// Create an idle bridge over `store`
    pub fn new(store: Arc<dyn ContactStore>, config: &ListenerConfig) -> Self {
        let (events, _rx) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            store,
            events,
            subscription: Mutex::new(None),
        }
    }

    /// Start republishing store changes
    ///
    /// Must be called from within a tokio runtime; the forwarding task is
    /// spawned on the current one.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyActive`] if a subscription already exists; the
    ///   existing one is left untouched
    pub fn setup(&self) -> Result<()> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(Error::AlreadyActive);
        }

        let runtime = Handle::try_current()
            .map_err(|e| Error::Other(format!("listener setup needs a tokio runtime: {}", e)))?;

        // Subscribe before returning so no change after setup() is missed
        let mut changes = self.store.watch_changes();
        let events = self.events.clone();
        let store_name = self.store.store_name();

        let task = runtime.spawn(async move {
            while let Some(payload) = changes.next().await {
                if events.send(ContactChangedEvent::new(payload)).is_err() {
                    debug!("No observers for contact change, event dropped");
                }
            }
            warn!("Change feed from {} store ended", store_name);
        });

        *slot = Some(task);
        info!("Listening for contact changes from {} store", store_name);
        Ok(())
    }

    /// Stop republishing store changes
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveObserver`] if the bridge is idle
    pub fn remove(&self) -> Result<()> {
        let Some(task) = self.slot().take() else {
            return Err(Error::NoActiveObserver);
        };

        // Aborting drops the raw stream, which unregisters from the store
        task.abort();
        info!("Stopped listening for contact changes");
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.slot().is_some()
    }

    pub fn state(&self) -> ListenerState {
        if self.is_listening() {
            ListenerState::Active
        } else {
            ListenerState::Idle
        }
    }

    /// Register a local observer
    ///
    /// Every observer receives every event published after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<ContactChangedEvent> {
        self.events.subscribe()
    }

    /// Register a local observer as a stream
    ///
    /// An observer that lags behind the channel capacity skips the missed
    /// events and keeps going.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = ContactChangedEvent> + Send + 'static>> {
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(err) => {
                warn!("Contact change observer fell behind: {}", err);
                None
            }
        });
        Box::pin(stream)
    }

    /// Number of currently registered local observers
    pub fn observer_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ChangeListenerBridge {
    fn drop(&mut self) {
        if let Some(task) = self.slot().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for ChangeListenerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeListenerBridge")
            .field("store", &self.store.store_name())
            .field("state", &self.state())
            .finish()
    }
}
