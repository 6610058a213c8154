//! LMDB implementation of DirectoryStore.
//!
//! `usernames` maps the username bytes to a user id. Responsibility is stored in
//! both directions: `org_responsibles` (`org ++ user`) and `user_orgs`
//! (`user ++ org`), always written together.

use procura_store::{DirectoryStore, StoreError};
use procura_types::{Organization, OrganizationId, User, UserId};

use crate::codec::{encode, pair_key, scan_prefix, trailing_id, ID_LEN};
use crate::{LmdbError, LmdbStore};

impl DirectoryStore for LmdbStore {
    fn user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id_bytes = self
            .dbs
            .usernames
            .get(&rtxn, username.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("username {username}")))?;
        let id: [u8; ID_LEN] = id_bytes
            .try_into()
            .map_err(|_| LmdbError::Corruption(format!("username index for {username}")))?;
        self.load(&rtxn, self.dbs.users, &id)?
            .ok_or_else(|| StoreError::Corruption(format!("username {username} has no user")))
    }

    fn get_user(&self, id: &UserId) -> Result<User, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(&rtxn, self.dbs.users, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn get_organization(&self, id: &OrganizationId) -> Result<Organization, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(&rtxn, self.dbs.organizations, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("organization {id}")))
    }

    fn organizations_of(&self, user: &UserId) -> Result<Vec<OrganizationId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut orgs = Vec::new();
        for (key, _) in scan_prefix(self.dbs.user_orgs, &rtxn, user.as_bytes())? {
            orgs.push(OrganizationId::from_bytes(trailing_id(&key)?));
        }
        Ok(orgs)
    }

    fn responsible_users(&self, org: &OrganizationId) -> Result<Vec<UserId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut users = Vec::new();
        for (key, _) in scan_prefix(self.dbs.org_responsibles, &rtxn, org.as_bytes())? {
            users.push(UserId::from_bytes(trailing_id(&key)?));
        }
        Ok(users)
    }

    fn put_user(&self, user: &User) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let holder = self
            .dbs
            .usernames
            .get(&wtxn, user.username.as_bytes())
            .map_err(LmdbError::from)?
            .map(|bytes| bytes.to_vec());
        if let Some(holder) = holder {
            if holder.as_slice() != user.id.as_bytes() {
                return Err(StoreError::Duplicate(format!("username {}", user.username)));
            }
        }

        let previous: Option<User> = self.load(&wtxn, self.dbs.users, user.id.as_bytes())?;
        if let Some(previous) = previous {
            if previous.username != user.username {
                self.dbs
                    .usernames
                    .delete(&mut wtxn, previous.username.as_bytes())
                    .map_err(LmdbError::from)?;
            }
        }

        self.dbs
            .users
            .put(&mut wtxn, user.id.as_bytes(), &encode(user)?)
            .map_err(LmdbError::from)?;
        self.dbs
            .usernames
            .put(&mut wtxn, user.username.as_bytes(), user.id.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_organization(&self, org: &Organization) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.dbs
            .organizations
            .put(&mut wtxn, org.id.as_bytes(), &encode(org)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_responsible(&self, org: &OrganizationId, user: &UserId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let org_exists = self
            .dbs
            .organizations
            .get(&wtxn, org.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        if !org_exists {
            return Err(StoreError::NotFound(format!("organization {org}")));
        }
        let user_exists = self
            .dbs
            .users
            .get(&wtxn, user.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        if !user_exists {
            return Err(StoreError::NotFound(format!("user {user}")));
        }

        self.dbs
            .org_responsibles
            .put(&mut wtxn, &pair_key(org.as_bytes(), user.as_bytes()), &[])
            .map_err(LmdbError::from)?;
        self.dbs
            .user_orgs
            .put(&mut wtxn, &pair_key(user.as_bytes(), org.as_bytes()), &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::temp_env;
    use procura_types::{OrganizationKind, Timestamp};

    fn user(name: &str) -> User {
        User {
            id: UserId::new(),
            username: name.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: Timestamp::from_secs(1),
        }
    }

    fn org() -> Organization {
        Organization {
            id: OrganizationId::new(),
            name: "Acme".into(),
            description: String::new(),
            kind: OrganizationKind::LLC,
            created_at: Timestamp::from_secs(1),
        }
    }

    #[test]
    fn lookup_by_username() {
        let (_dir, env) = temp_env();
        let store = env.store();
        let alice = user("alice");
        store.put_user(&alice).unwrap();
        assert_eq!(store.user_by_username("alice").unwrap(), alice);
        assert!(store.user_by_username("bob").unwrap_err().is_not_found());
    }

    #[test]
    fn username_is_unique() {
        let (_dir, env) = temp_env();
        let store = env.store();
        store.put_user(&user("alice")).unwrap();
        assert!(matches!(
            store.put_user(&user("alice")),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn renaming_frees_old_username() {
        let (_dir, env) = temp_env();
        let store = env.store();
        let mut alice = user("alice");
        store.put_user(&alice).unwrap();
        alice.username = "alicia".into();
        store.put_user(&alice).unwrap();
        assert!(store.user_by_username("alice").is_err());
        assert_eq!(store.user_by_username("alicia").unwrap().id, alice.id);
    }

    #[test]
    fn responsibility_is_bidirectional() {
        let (_dir, env) = temp_env();
        let store = env.store();
        let (alice, bob, acme) = (user("alice"), user("bob"), org());
        store.put_user(&alice).unwrap();
        store.put_user(&bob).unwrap();
        store.put_organization(&acme).unwrap();
        store.put_responsible(&acme.id, &alice.id).unwrap();
        store.put_responsible(&acme.id, &bob.id).unwrap();
        store.put_responsible(&acme.id, &bob.id).unwrap();

        assert_eq!(store.organizations_of(&alice.id).unwrap(), vec![acme.id]);
        let mut users = store.responsible_users(&acme.id).unwrap();
        users.sort();
        let mut expected = vec![alice.id, bob.id];
        expected.sort();
        assert_eq!(users, expected);
    }

    #[test]
    fn responsibility_needs_both_records() {
        let (_dir, env) = temp_env();
        let store = env.store();
        let alice = user("alice");
        store.put_user(&alice).unwrap();
        assert!(store
            .put_responsible(&OrganizationId::new(), &alice.id)
            .unwrap_err()
            .is_not_found());
    }
}
