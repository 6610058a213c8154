//! Metadata storage trait.

use crate::StoreError;

/// Key-value bookkeeping that doesn't belong to any domain store.
pub trait MetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Current schema version; `0` for a database that was never initialised.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
