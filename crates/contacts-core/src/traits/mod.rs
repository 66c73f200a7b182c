//! Core traits for the contacts layer
//!
//! This module defines the abstract interface the host's contact store
//! must implement.
//!
//! - [`ContactStore`]: record CRUD, name lookup and the raw change feed

pub mod contact_store;

pub use contact_store::{ChangeStream, ContactStore, ContactStoreFactory};
