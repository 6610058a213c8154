//! LMDB storage backend for the procura service.
//!
//! Implements every storage trait from `procura-store` using the `heed` LMDB bindings.
//! All logical stores share one environment so a lifecycle mutation and its snapshot
//! land in a single write transaction.

pub mod bid;
pub mod codec;
pub mod directory;
pub mod endorsement;
pub mod environment;
pub mod error;
pub mod feedback;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod snapshot;
pub mod tender;

pub use environment::{LmdbEnvironment, LmdbStore};
pub use error::LmdbError;
pub use integrity::{check_history, IntegrityReport};
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
