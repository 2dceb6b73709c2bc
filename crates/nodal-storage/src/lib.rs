//! Nodal Storage - Storage backends and the graph store engine
//!
//! [`Store`] implements [`nodal_core::GraphStore`] on top of any
//! [`StorageBackend`]. Backends persist records and maintain the type and
//! adjacency indexes; the store validates input and assigns identities.

#![allow(clippy::result_large_err)]

pub mod config;
pub mod error;
pub mod migration;
pub mod store;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

pub use config::{BackendKind, StoreConfig};
pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION};
pub use store::Store;
pub use traits::StorageBackend;

#[cfg(feature = "redb")]
pub use redb::RedbStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

pub use memory::MemoryStorage;
