// # contacts-core
//
// Mediation layer between application code and a host-managed,
// permissioned contact store.
//
// ## Architecture Overview
//
// - **schema**: canonical `Contact` record and the optional-property set
// - **validation**: structural/type checks on every inbound argument
// - **projection**: allow-list filter for `extraProperties`
// - **dispatcher**: public operations (validate, then delegate once)
// - **listener**: single-slot change subscription with local fan-out
// - **ContactStore**: trait the host's native store implements
//
// ## Design Principles
//
// 1. **Fail before the boundary**: malformed input never reaches the store
// 2. **Pass-through**: store results and errors are returned unchanged
// 3. **Single-shot**: no operation retries
// 4. **Owned state**: the listener lives in an `AddressBook`, not a global

pub mod address_book;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod listener;
pub mod projection;
pub mod registry;
pub mod schema;
pub mod store;
pub mod traits;
pub mod validation;

// Re-export core types for convenience
pub use address_book::AddressBook;
pub use config::{ContactsConfig, ListenerConfig, StoreConfig};
pub use dispatcher::CommandDispatcher;
pub use error::{Error, ErrorKind, Result};
pub use listener::{CONTACT_CHANGED, ChangeListenerBridge, ContactChangedEvent, ListenerState};
pub use registry::StoreRegistry;
pub use schema::{AuthStatus, Contact, CreateOutcome, DeleteTarget, OptionalProperty};
pub use store::MemoryContactStore;
pub use traits::ContactStore;
