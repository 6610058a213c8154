//! LMDB environment setup.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;

use crate::codec::decode;
use crate::meta::LmdbMetaStore;
use crate::migration::Migrator;
use crate::LmdbError;

/// Upper bound on named databases in one environment.
pub const MAX_DBS: u32 = 16;

/// Handles of every named database. Cheap to copy.
#[derive(Clone, Copy)]
pub(crate) struct Databases {
    pub tenders: Database<Bytes, Bytes>,
    pub tender_versions: Database<Bytes, Bytes>,
    pub bids: Database<Bytes, Bytes>,
    pub bid_versions: Database<Bytes, Bytes>,
    pub endorsements: Database<Bytes, Bytes>,
    pub feedback: Database<Bytes, Bytes>,
    pub users: Database<Bytes, Bytes>,
    pub usernames: Database<Bytes, Bytes>,
    pub organizations: Database<Bytes, Bytes>,
    pub org_responsibles: Database<Bytes, Bytes>,
    pub user_orgs: Database<Bytes, Bytes>,
    pub meta: Database<Bytes, Bytes>,
}

/// Names of the databases created by [`LmdbEnvironment::open`].
pub const DATABASE_NAMES: &[&str] = &[
    "tenders",
    "tender_versions",
    "bids",
    "bid_versions",
    "endorsements",
    "feedback",
    "users",
    "usernames",
    "organizations",
    "org_responsibles",
    "user_orgs",
    "meta",
];

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    dbs: Databases,
    schema_version: OnceLock<u32>,
    schema_lock: Mutex<()>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at `path` and create the named databases.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;

        // SAFETY: the environment is opened once per path by this process and never
        // concurrently with another open of the same files.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let dbs = Databases {
            tenders: env.create_database(&mut wtxn, Some("tenders"))?,
            tender_versions: env.create_database(&mut wtxn, Some("tender_versions"))?,
            bids: env.create_database(&mut wtxn, Some("bids"))?,
            bid_versions: env.create_database(&mut wtxn, Some("bid_versions"))?,
            endorsements: env.create_database(&mut wtxn, Some("endorsements"))?,
            feedback: env.create_database(&mut wtxn, Some("feedback"))?,
            users: env.create_database(&mut wtxn, Some("users"))?,
            usernames: env.create_database(&mut wtxn, Some("usernames"))?,
            organizations: env.create_database(&mut wtxn, Some("organizations"))?,
            org_responsibles: env.create_database(&mut wtxn, Some("org_responsibles"))?,
            user_orgs: env.create_database(&mut wtxn, Some("user_orgs"))?,
            meta: env.create_database(&mut wtxn, Some("meta"))?,
        };
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "lmdb environment opened");

        Ok(Self {
            env: Arc::new(env),
            dbs,
            schema_version: OnceLock::new(),
            schema_lock: Mutex::new(()),
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Handle implementing every procurement storage trait.
    pub fn store(&self) -> LmdbStore {
        LmdbStore {
            env: Arc::clone(&self.env),
            dbs: self.dbs,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.dbs.meta,
        }
    }

    /// Bring the schema up to date. Migrations run at most once per environment;
    /// later calls return the cached version.
    pub fn ensure_schema(&self) -> Result<u32, LmdbError> {
        if let Some(version) = self.schema_version.get() {
            return Ok(*version);
        }
        let _guard = self
            .schema_lock
            .lock()
            .map_err(|_| LmdbError::Heed("schema lock poisoned".to_string()))?;
        if let Some(version) = self.schema_version.get() {
            return Ok(*version);
        }
        let version = Migrator::run(&self.meta_store())?;
        let _ = self.schema_version.set(version);
        Ok(version)
    }
}

/// Shared handle over the environment; implements the `procura-store` traits.
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    pub(crate) dbs: Databases,
}

impl LmdbStore {
    pub(crate) fn load<T: DeserializeOwned>(
        &self,
        txn: &RoTxn,
        db: Database<Bytes, Bytes>,
        key: &[u8],
    ) -> Result<Option<T>, LmdbError> {
        match db.get(txn, key)? {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// Decode every value of `db`.
    pub(crate) fn load_all<T: DeserializeOwned>(
        &self,
        txn: &RoTxn,
        db: Database<Bytes, Bytes>,
    ) -> Result<Vec<T>, LmdbError> {
        let mut out = Vec::new();
        for entry in db.iter(txn)? {
            let (_key, val) = entry?;
            out.push(decode(val)?);
        }
        Ok(out)
    }
}
