//! Schema versions and the steps between them.
//!
//! Each [`Step`] moves the database from `to - 1` to `to`. The stored version is
//! bumped after every step so an interrupted upgrade resumes where it stopped.

use procura_store::MetaStore;

use crate::LmdbError;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

struct Step {
    to: u32,
    name: &'static str,
    apply: fn() -> Result<(), LmdbError>,
}

const STEPS: &[Step] = &[Step {
    to: 1,
    name: "initial procurement databases",
    apply: initial_databases,
}];

/// The named databases themselves are created by `LmdbEnvironment::open`.
fn initial_databases() -> Result<(), LmdbError> {
    Ok(())
}

pub struct Migrator;

impl Migrator {
    /// Apply every step above the stored version. Returns the resulting version.
    ///
    /// A database stamped by a newer build is refused with `SchemaTooNew`.
    pub fn run(meta: &impl MetaStore) -> Result<u32, LmdbError> {
        let stored = meta.get_schema_version().map_err(backend)?;
        if stored > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        let pending: Vec<&Step> = STEPS.iter().filter(|s| s.to > stored).collect();
        if pending.is_empty() {
            tracing::debug!(version = stored, "schema current");
            return Ok(stored);
        }
        for step in pending {
            tracing::info!(to = step.to, step = step.name, "applying schema step");
            (step.apply)()?;
            meta.set_schema_version(step.to).map_err(backend)?;
        }
        Ok(CURRENT_SCHEMA_VERSION)
    }
}

fn backend(e: procura_store::StoreError) -> LmdbError {
    match e {
        procura_store::StoreError::Corruption(msg) => LmdbError::Corruption(msg),
        other => LmdbError::Heed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::temp_env;

    #[test]
    fn steps_are_contiguous_and_end_at_current() {
        for (i, step) in STEPS.iter().enumerate() {
            assert_eq!(step.to, i as u32 + 1);
        }
        assert_eq!(STEPS.last().map(|s| s.to), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn fresh_database_is_stamped() {
        let (_dir, env) = temp_env();
        let meta = env.meta_store();
        assert_eq!(Migrator::run(&meta).unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(meta.get_schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(Migrator::run(&meta).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let (_dir, env) = temp_env();
        let meta = env.meta_store();
        meta.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(
            Migrator::run(&meta),
            Err(LmdbError::SchemaTooNew { .. })
        ));
    }
}
