// # Memory Contact Store
//
// In-memory implementation of ContactStore.
//
// ## Purpose
//
// Stands in for the host's native contact framework where none is
// available: tests, CI, and the bridge binary's default mode. It honors
// the same contract a native store must: projection of optional fields,
// name matching, identifier or name resolution, an authorization gate,
// and a raw change feed.
//
// ## Matching
//
// - Lookup: every whitespace-separated token of the query must be a
//   case-insensitive prefix of a first, middle, last or nick name. An
//   empty query matches nothing.
// - Update/delete by name: the full name must match exactly (ignoring
//   ASCII case). More than one match is ambiguous.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::Error;
use crate::config::StoreConfig;
use crate::schema::{AuthStatus, Contact, CreateOutcome, DeleteTarget, OptionalProperty};
use crate::traits::{ChangeStream, ContactStore, ContactStoreFactory};

/// Unread payloads each change feed subscriber may buffer by default
pub const DEFAULT_CHANGE_FEED_CAPACITY: usize = 256;

/// In-memory contact store
///
/// All state lives behind a RwLock and is lost when the store is dropped.
/// Clones share the same records and change feed.
///
/// # Example
///
/// ```rust,no_run
/// use contacts_core::store::MemoryContactStore;
/// use contacts_core::schema::Contact;
/// use contacts_core::traits::ContactStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryContactStore::new();
///
///     store
///         .create(Contact::new().with_first_name("William").with_last_name("Grapeseed"))
///         .await?;
///
///     let found = store.find_by_name("William Grapeseed", &[]).await?;
///     assert_eq!(found.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryContactStore {
    inner: Arc<RwLock<MemoryState>>,
    next_id: Arc<AtomicU64>,
    changes: broadcast::Sender<Value>,
}

#[derive(Debug)]
struct MemoryState {
    authorization: AuthStatus,
    records: Vec<Contact>,
}

impl MemoryContactStore {
    /// Create an empty, authorized store
    pub fn new() -> Self {
        Self::with_authorization(AuthStatus::Authorized)
    }

    /// Create an empty store in the given authorization state
    pub fn with_authorization(authorization: AuthStatus) -> Self {
        Self::with_capacity(authorization, DEFAULT_CHANGE_FEED_CAPACITY)
    }

    /// Create an empty store whose change feed buffers up to `capacity`
    /// unread payloads per subscriber
    ///
    /// A subscriber that falls further behind loses the oldest payloads,
    /// with a warning log.
    pub fn with_capacity(authorization: AuthStatus, capacity: usize) -> Self {
        let (changes, _rx) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(RwLock::new(MemoryState {
                authorization,
                records: Vec::new(),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
            changes,
        }
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    /// Change the authorization status (simulates the user toggling access)
    pub async fn set_authorization(&self, authorization: AuthStatus) {
        self.inner.write().await.authorization = authorization;
    }

    fn emit_change(&self, kind: &str, identifier: &str) {
        // No subscribers is not an error
        let _ = self.changes.send(json!({
            "kind": kind,
            "identifier": identifier,
        }));
    }

    fn allocate_identifier(&self) -> String {
        format!("memory-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn ensure_authorized(&self) -> Result<(), Error> {
        match self.authorization {
            AuthStatus::Authorized => Ok(()),
            status => Err(Error::access_denied(format!(
                "contacts authorization status is {}",
                status
            ))),
        }
    }

    /// Index of the single record `identifier` or `name` resolves to
    fn resolve(&self, identifier: Option<&str>, name: &str) -> Result<usize, Error> {
        if let Some(identifier) = identifier {
            return self
                .records
                .iter()
                .position(|record| record.identifier.as_deref() == Some(identifier))
                .ok_or_else(|| Error::not_found(format!("no contact with identifier {}", identifier)));
        }

        if name.is_empty() {
            return Err(Error::not_found("no identifier or name to resolve"));
        }

        let mut matches = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.full_name().eq_ignore_ascii_case(name))
            .map(|(index, _)| index);

        match (matches.next(), matches.next()) {
            (Some(index), None) => Ok(index),
            (None, _) => Err(Error::not_found(format!("no contact named '{}'", name))),
            (Some(_), Some(_)) => Err(Error::ambiguous(format!(
                "more than one contact named '{}'",
                name
            ))),
        }
    }
}

fn matches_query(contact: &Contact, tokens: &[String]) -> bool {
    let parts: Vec<String> = [
        &contact.first_name,
        &contact.middle_name,
        &contact.last_name,
        &contact.nickname,
    ]
    .into_iter()
    .flatten()
    .map(|part| part.to_lowercase())
    .collect();

    tokens
        .iter()
        .all(|token| parts.iter().any(|part| part.starts_with(token.as_str())))
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn authorization_status(&self) -> Result<AuthStatus, Error> {
        Ok(self.inner.read().await.authorization)
    }

    async fn request_access(&self) -> Result<AuthStatus, Error> {
        let mut guard = self.inner.write().await;
        if guard.authorization == AuthStatus::NotDetermined {
            guard.authorization = AuthStatus::Authorized;
        }
        Ok(guard.authorization)
    }

    async fn list_all(&self, extra: &[OptionalProperty]) -> Result<Vec<Contact>, Error> {
        let guard = self.inner.read().await;
        guard.ensure_authorized()?;
        Ok(guard.records.iter().map(|record| record.project(extra)).collect())
    }

    async fn find_by_name(
        &self,
        name: &str,
        extra: &[OptionalProperty],
    ) -> Result<Vec<Contact>, Error> {
        let guard = self.inner.read().await;
        guard.ensure_authorized()?;

        let tokens: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        Ok(guard
            .records
            .iter()
            .filter(|record| matches_query(record, &tokens))
            .map(|record| record.project(extra))
            .collect())
    }

    async fn create(&self, mut contact: Contact) -> Result<CreateOutcome, Error> {
        let identifier = {
            let mut guard = self.inner.write().await;
            guard.ensure_authorized()?;

            let identifier = self.allocate_identifier();
            contact.identifier = Some(identifier.clone());
            guard.records.push(contact);
            identifier
        };

        debug!("Created contact {}", identifier);
        self.emit_change("created", &identifier);
        Ok(CreateOutcome::Created { identifier })
    }

    async fn update(&self, contact: Contact) -> Result<bool, Error> {
        let identifier = {
            let mut guard = self.inner.write().await;
            guard.ensure_authorized()?;

            let index = guard.resolve(contact.identifier.as_deref(), &contact.full_name())?;
            let record = &mut guard.records[index];
            record.merge(contact);
            record.identifier.clone().unwrap_or_default()
        };

        debug!("Updated contact {}", identifier);
        self.emit_change("updated", &identifier);
        Ok(true)
    }

    async fn delete(&self, target: &DeleteTarget) -> Result<bool, Error> {
        let identifier = {
            let mut guard = self.inner.write().await;
            guard.ensure_authorized()?;

            let index = match target {
                DeleteTarget::Identifier(identifier) => guard.resolve(Some(identifier.as_str()), "")?,
                DeleteTarget::Name(name) => guard.resolve(None, name)?,
            };
            guard.records.remove(index).identifier.unwrap_or_default()
        };

        debug!("Deleted contact {}", identifier);
        self.emit_change("deleted", &identifier);
        Ok(true)
    }

    fn watch_changes(&self) -> ChangeStream {
        let stream = BroadcastStream::new(self.changes.subscribe()).filter_map(|change| match change {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!("Memory store change feed subscriber fell behind: {}", err);
                None
            }
        });
        Box::pin(stream)
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for creating memory contact stores
pub struct MemoryContactStoreFactory;

impl ContactStoreFactory for MemoryContactStoreFactory {
    fn create(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>, Error> {
        match config {
            StoreConfig::Memory {
                authorization,
                change_feed_capacity,
            } => Ok(Arc::new(MemoryContactStore::with_capacity(
                *authorization,
                *change_feed_capacity,
            ))),
            _ => Err(Error::config("Invalid config for memory contact store")),
        }
    }
}
