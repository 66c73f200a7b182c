// # Contact Store Trait
//
// Defines the interface of the external, permissioned contact store this
// layer fronts.
//
// ## Implementations
//
// - In-memory: `store::memory` (tests, the bridge binary)
// - Host bindings: provided by the embedding application
//
// ## Usage
//
// ```rust,ignore
// use contacts_core::ContactStore;
// use tokio_stream::StreamExt;
//
// #[tokio::main]
// async fn main() -> Result<(), Box<dyn std::error::Error>> {
//     let store = /* ContactStore implementation */;
//
//     let everyone = store.list_all(&[]).await?;
//
//     let mut changes = store.watch_changes();
//     while let Some(payload) = changes.next().await {
//         println!("contacts changed: {}", payload);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde_json::Value;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::schema::{AuthStatus, Contact, CreateOutcome, DeleteTarget, OptionalProperty};

/// Raw change notifications, one opaque payload per store mutation
pub type ChangeStream = Pin<Box<dyn Stream<Item = Value> + Send + 'static>>;

/// Trait for contact store implementations
///
/// Every argument reaching these methods has already been validated by
/// the dispatcher. Implementations own persistence, name matching and
/// record resolution.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Allowed
/// - ✅ Perform the I/O of the host contact framework
/// - ✅ Decide matching semantics for names and update targets
/// - ✅ Return `NotFound`, `Ambiguous`, `AccessDenied` or `Store` errors
///
/// ## Forbidden
/// - ❌ Retry failed calls (every call is single-shot)
/// - ❌ Re-validate argument shapes (owned by the validation pipeline)
/// - ❌ Track listener state (owned by `ChangeListenerBridge`)
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Current authorization status, without prompting
    async fn authorization_status(&self) -> Result<AuthStatus, crate::Error>;

    /// Ask the host for access and resolve to the resulting status
    async fn request_access(&self) -> Result<AuthStatus, crate::Error>;

    /// Every contact, with the default fields plus `extra`
    async fn list_all(&self, extra: &[OptionalProperty]) -> Result<Vec<Contact>, crate::Error>;

    /// Contacts matching `name`, with the default fields plus `extra`
    ///
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn find_by_name(
        &self,
        name: &str,
        extra: &[OptionalProperty],
    ) -> Result<Vec<Contact>, crate::Error>;

    /// Save a new contact
    async fn create(&self, contact: Contact) -> Result<CreateOutcome, crate::Error>;

    /// Apply the present fields of `contact` to an existing record
    ///
    /// How the target is resolved (identifier, name) is store-defined.
    async fn update(&self, contact: Contact) -> Result<bool, crate::Error>;

    /// Remove the record `target` resolves to
    async fn delete(&self, target: &DeleteTarget) -> Result<bool, crate::Error>;

    /// Subscribe to the raw change feed
    ///
    /// Dropping the returned stream unregisters the subscription. The
    /// stream yields payloads in the order the store emits them.
    fn watch_changes(&self) -> ChangeStream;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing contact stores from configuration
pub trait ContactStoreFactory: Send + Sync {
    /// Create a ContactStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Store configuration
    ///
    /// # Returns
    ///
    /// A shared ContactStore trait object
    fn create(
        &self,
        config: &crate::config::StoreConfig,
    ) -> Result<std::sync::Arc<dyn ContactStore>, crate::Error>;
}
