// # Contact Store Implementations
//
// This module provides implementations of the ContactStore trait that do
// not need a host binding.

pub mod memory;

pub use memory::{DEFAULT_CHANGE_FEED_CAPACITY, MemoryContactStore, MemoryContactStoreFactory};
