//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the layer
//! talks to the store, without implementing real contact storage.

#![allow(dead_code)]

use contacts_core::error::Result;
use contacts_core::schema::{AuthStatus, Contact, CreateOutcome, DeleteTarget, OptionalProperty};
use contacts_core::traits::{ChangeStream, ContactStore};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A store that counts every call and lets the test push raw changes
pub struct RecordingStore {
    /// Total calls across all CRUD/lookup methods
    calls: Arc<AtomicUsize>,
    /// Calls to watch_changes()
    watch_calls: Arc<AtomicUsize>,
    /// Last property list a read received
    last_extra: Arc<std::sync::Mutex<Vec<OptionalProperty>>>,
    /// Senders of every stream handed out by watch_changes()
    feeds: Arc<std::sync::Mutex<Vec<mpsc::UnboundedSender<Value>>>>,
    /// Error the next CRUD call returns, if any
    fail_with: Arc<std::sync::Mutex<Option<fn() -> contacts_core::Error>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            watch_calls: Arc::new(AtomicUsize::new(0)),
            last_extra: Arc::new(std::sync::Mutex::new(Vec::new())),
            feeds: Arc::new(std::sync::Mutex::new(Vec::new())),
            fail_with: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    /// Get the number of store calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Get the number of times watch_changes() was called
    pub fn watch_call_count(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    /// The property list passed to the most recent read
    pub fn last_extra(&self) -> Vec<OptionalProperty> {
        self.last_extra.lock().unwrap().clone()
    }

    /// Make every subsequent CRUD call fail with `error()`
    pub fn fail_with(&self, error: fn() -> contacts_core::Error) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    /// Push a raw change to every live subscription; returns how many took it
    pub fn emit_change(&self, payload: Value) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|tx| !tx.is_closed());
        feeds
            .iter()
            .filter(|tx| tx.send(payload.clone()).is_ok())
            .count()
    }

    /// Number of raw subscriptions still held by someone
    pub fn live_subscriptions(&self) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|tx| !tx.is_closed());
        feeds.len()
    }

    /// A handle sharing this store's counters and feeds
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            calls: Arc::clone(&other.calls),
            watch_calls: Arc::clone(&other.watch_calls),
            last_extra: Arc::clone(&other.last_extra),
            feeds: Arc::clone(&other.feeds),
            fail_with: Arc::clone(&other.fail_with),
        }
    }

    fn record(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.fail_with.lock().unwrap() {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ContactStore for RecordingStore {
    async fn authorization_status(&self) -> Result<AuthStatus> {
        self.record()?;
        Ok(AuthStatus::Authorized)
    }

    async fn request_access(&self) -> Result<AuthStatus> {
        self.record()?;
        Ok(AuthStatus::Authorized)
    }

    async fn list_all(&self, extra: &[OptionalProperty]) -> Result<Vec<Contact>> {
        self.record()?;
        *self.last_extra.lock().unwrap() = extra.to_vec();
        Ok(vec![Contact::new().with_first_name("Recorded")])
    }

    async fn find_by_name(&self, name: &str, extra: &[OptionalProperty]) -> Result<Vec<Contact>> {
        self.record()?;
        *self.last_extra.lock().unwrap() = extra.to_vec();
        Ok(vec![Contact::new().with_first_name(name)])
    }

    async fn create(&self, _contact: Contact) -> Result<CreateOutcome> {
        self.record()?;
        Ok(CreateOutcome::Saved(true))
    }

    async fn update(&self, _contact: Contact) -> Result<bool> {
        self.record()?;
        Ok(true)
    }

    async fn delete(&self, _target: &DeleteTarget) -> Result<bool> {
        self.record()?;
        Ok(true)
    }

    fn watch_changes(&self) -> ChangeStream {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().push(tx);
        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx))
    }

    fn store_name(&self) -> &'static str {
        "recording"
    }
}

/// Wait (bounded) until `condition` holds, giving spawned tasks time to run
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    condition()
}
