//! Bookkeeping keys in the `meta` database.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use procura_store::{MetaStore, StoreError};

use crate::LmdbError;

pub(crate) const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Handle over the `meta` database only. Obtained from
/// [`crate::LmdbEnvironment::meta_store`].
pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbMetaStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.meta_db.get(&rtxn, key.as_bytes())?.map(<[u8]>::to_vec))
    }
}

impl MetaStore for LmdbMetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.read(key)?
            .ok_or_else(|| StoreError::NotFound(format!("meta {key}")))
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let Some(raw) = self.read(SCHEMA_VERSION_KEY)? else {
            return Ok(0);
        };
        let bytes: [u8; 4] = raw.as_slice().try_into().map_err(|_| {
            LmdbError::Corruption(format!("{SCHEMA_VERSION_KEY} is {} bytes", raw.len()))
        })?;
        Ok(u32::from_be_bytes(bytes))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_be_bytes())
    }
}
