//! Command dispatcher
//!
//! Every public operation follows the same shape:
//!
//! 1. validate the raw arguments (synchronous, no store access)
//! 2. resolve `extraProperties` where the operation takes them
//! 3. make exactly one store call
//! 4. return the store's answer unchanged
//!
//! A validation failure means the store is never called. Store failures
//! are passed through without retry or reinterpretation.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::projection::resolve_extra_properties;
use crate::schema::{AuthStatus, Contact, CreateOutcome};
use crate::traits::ContactStore;
use crate::validation::{validate_contact_record, validate_delete_target, validate_name_query};

/// Front door for contact operations
#[derive(Clone)]
pub struct CommandDispatcher {
    store: Arc<dyn ContactStore>,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// The store this dispatcher delegates to
    pub fn store(&self) -> &Arc<dyn ContactStore> {
        &self.store
    }

    /// Current authorization status, straight from the store
    pub async fn authorization_status(&self) -> Result<AuthStatus> {
        let status = self.store.authorization_status().await;
        self.observe("authorization_status", status)
    }

    /// Ask the store for access
    pub async fn request_access(&self) -> Result<AuthStatus> {
        let status = self.store.request_access().await;
        self.observe("request_access", status)
    }

    /// Every contact, with the default fields plus any requested extras
    pub async fn list_all(&self, extra_properties: Option<&Value>) -> Result<Vec<Contact>> {
        let extra = rejected("list_all", resolve_extra_properties(extra_properties))?;

        debug!("list_all with {} extra propert(ies)", extra.len());
        let contacts = self.store.list_all(&extra).await;
        self.observe("list_all", contacts)
    }

    /// Contacts matching `name`
    ///
    /// The name is checked before the property list.
    pub async fn find_by_name(
        &self,
        name: &Value,
        extra_properties: Option<&Value>,
    ) -> Result<Vec<Contact>> {
        let name = rejected("find_by_name", validate_name_query(name))?;
        let extra = rejected("find_by_name", resolve_extra_properties(extra_properties))?;

        debug!("find_by_name '{}' with {} extra propert(ies)", name, extra.len());
        let contacts = self.store.find_by_name(name, &extra).await;
        self.observe("find_by_name", contacts)
    }

    /// Save a new contact
    pub async fn create(&self, contact: &Value) -> Result<CreateOutcome> {
        let contact = rejected("create", validate_contact_record(contact))?;

        debug!("create contact '{}'", contact.full_name());
        let outcome = self.store.create(contact).await;
        self.observe("create", outcome)
    }

    /// Update an existing contact
    ///
    /// The store resolves the target; a missing one surfaces as its own
    /// `NotFound` error.
    pub async fn update(&self, contact: &Value) -> Result<bool> {
        let contact = rejected("update", validate_contact_record(contact))?;

        debug!(
            "update contact {}",
            contact
                .identifier
                .clone()
                .unwrap_or_else(|| format!("'{}'", contact.full_name()))
        );
        let updated = self.store.update(contact).await;
        self.observe("update", updated)
    }

    /// Delete by identifier or, failing that, by name
    pub async fn delete(&self, target: &Value) -> Result<bool> {
        let target = rejected("delete", validate_delete_target(target))?;

        debug!("delete contact by {}", target);
        let deleted = self.store.delete(&target).await;
        self.observe("delete", deleted)
    }

    fn observe<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(
                "{} failed in {} store: {}",
                operation,
                self.store.store_name(),
                e
            );
        }
        result
    }
}

fn rejected<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        debug!("{} rejected before reaching the store: {}", operation, e);
    }
    result
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("store", &self.store.store_name())
            .finish()
    }
}
