//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input key mapping
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;

pub use input::{Key, TickInput};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
