//! Seeding users and organizations from a TOML file.
//!
//! The service itself never creates directory records, so operators load
//! them with `procura-daemon directory import <FILE>`:
//!
//! ```toml
//! [[users]]
//! username = "alice"
//! first_name = "Alice"
//! last_name = "Smith"
//!
//! [[organizations]]
//! name = "Acme"
//! description = "Builders"
//! type = "LLC"
//! responsible = ["alice"]
//! ```
//!
//! Re-importing the same file is a no-op: known usernames and organization
//! ids are skipped, and responsibility links are idempotent.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use procura_store::DirectoryStore;
use procura_types::{Clock, Organization, OrganizationId, OrganizationKind, User, UserId};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryFile {
    #[serde(default)]
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub organizations: Vec<OrganizationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationEntry {
    /// Fixed id, needed for re-imports to recognise the organization.
    #[serde(default)]
    pub id: Option<OrganizationId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Usernames of the organization's responsible employees.
    #[serde(default)]
    pub responsible: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub users_created: usize,
    pub users_skipped: usize,
    pub organizations_created: usize,
    pub organizations_skipped: usize,
    pub responsible_links: usize,
}

impl DirectoryFile {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading directory file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Write every record into `store`, skipping ones that already exist.
    pub fn import<S: DirectoryStore>(
        &self,
        store: &S,
        clock: &dyn Clock,
    ) -> anyhow::Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut ids: HashMap<&str, UserId> = HashMap::new();

        for entry in &self.users {
            if entry.username.is_empty() {
                bail!("user entry with an empty username");
            }
            match store.user_by_username(&entry.username) {
                Ok(existing) => {
                    summary.users_skipped += 1;
                    ids.insert(&entry.username, existing.id);
                }
                Err(e) if e.is_not_found() => {
                    let user = User {
                        id: entry.id.unwrap_or_default(),
                        username: entry.username.clone(),
                        first_name: entry.first_name.clone(),
                        last_name: entry.last_name.clone(),
                        created_at: clock.now(),
                    };
                    store
                        .put_user(&user)
                        .with_context(|| format!("storing user {}", user.username))?;
                    tracing::debug!(username = %user.username, id = %user.id, "user imported");
                    summary.users_created += 1;
                    ids.insert(&entry.username, user.id);
                }
                Err(e) => return Err(e).context("looking up user"),
            }
        }

        for entry in &self.organizations {
            let kind: OrganizationKind = entry
                .kind
                .parse()
                .with_context(|| format!("organization {}", entry.name))?;
            let id = entry.id.unwrap_or_default();

            match store.get_organization(&id) {
                Ok(_) => summary.organizations_skipped += 1,
                Err(e) if e.is_not_found() => {
                    let org = Organization {
                        id,
                        name: entry.name.clone(),
                        description: entry.description.clone(),
                        kind,
                        created_at: clock.now(),
                    };
                    store
                        .put_organization(&org)
                        .with_context(|| format!("storing organization {}", org.name))?;
                    tracing::debug!(name = %org.name, %id, "organization imported");
                    summary.organizations_created += 1;
                }
                Err(e) => return Err(e).context("looking up organization"),
            }

            for username in &entry.responsible {
                let user = match ids.get(username.as_str()) {
                    Some(user) => *user,
                    None => store
                        .user_by_username(username)
                        .with_context(|| format!("responsible user {username} is unknown"))?
                        .id,
                };
                store.put_responsible(&id, &user)?;
                summary.responsible_links += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procura_nullables::{NullClock, NullStore};

    const SAMPLE: &str = r#"
        [[users]]
        username = "alice"
        first_name = "Alice"
        last_name = "Smith"

        [[users]]
        username = "bob"

        [[organizations]]
        id = "5b1c3a52-3a6c-4f0e-9d0a-2b9c9a2f7e11"
        name = "Acme"
        description = "Builders"
        type = "LLC"
        responsible = ["alice", "bob"]
    "#;

    #[test]
    fn import_creates_users_and_links() {
        let store = NullStore::new();
        let clock = NullClock::default();
        let file = DirectoryFile::from_toml_str(SAMPLE).unwrap();

        let summary = file.import(&store, &clock).unwrap();
        assert_eq!(summary.users_created, 2);
        assert_eq!(summary.organizations_created, 1);
        assert_eq!(summary.responsible_links, 2);

        let alice = store.user_by_username("alice").unwrap();
        let org: OrganizationId = "5b1c3a52-3a6c-4f0e-9d0a-2b9c9a2f7e11".parse().unwrap();
        assert_eq!(store.organizations_of(&alice.id).unwrap(), vec![org]);
        assert_eq!(store.responsible_users(&org).unwrap().len(), 2);
    }

    #[test]
    fn reimport_skips_known_records() {
        let store = NullStore::new();
        let clock = NullClock::default();
        let file = DirectoryFile::from_toml_str(SAMPLE).unwrap();
        file.import(&store, &clock).unwrap();

        let again = file.import(&store, &clock).unwrap();
        assert_eq!(again.users_created, 0);
        assert_eq!(again.users_skipped, 2);
        assert_eq!(again.organizations_skipped, 1);
        let org: OrganizationId = "5b1c3a52-3a6c-4f0e-9d0a-2b9c9a2f7e11".parse().unwrap();
        assert_eq!(store.responsible_users(&org).unwrap().len(), 2);
    }

    #[test]
    fn import_reads_directory_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let file = DirectoryFile::from_toml_file(&path).unwrap();
        let store = NullStore::new();
        let summary = file.import(&store, &NullClock::default()).unwrap();
        assert_eq!(summary.users_created, 2);
        assert_eq!(store.user_by_username("bob").unwrap().username, "bob");
    }

    #[test]
    fn malformed_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[users]\nusername = ").unwrap();

        let err = DirectoryFile::from_toml_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn unknown_organization_type_is_rejected() {
        let file = DirectoryFile::from_toml_str(
            r#"
            [[organizations]]
            name = "Acme"
            type = "GmbH"
            "#,
        )
        .unwrap();
        let err = file.import(&NullStore::new(), &NullClock::default()).unwrap_err();
        assert!(format!("{err:#}").contains("GmbH"));
    }

    #[test]
    fn unknown_responsible_user_is_rejected() {
        let file = DirectoryFile::from_toml_str(
            r#"
            [[organizations]]
            name = "Acme"
            type = "IE"
            responsible = ["ghost"]
            "#,
        )
        .unwrap();
        assert!(file.import(&NullStore::new(), &NullClock::default()).is_err());
    }
}
