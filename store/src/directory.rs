//! Users, organizations and who is responsible for what.

use procura_types::{Organization, OrganizationId, User, UserId};

use crate::StoreError;

pub trait DirectoryStore {
    fn user_by_username(&self, username: &str) -> Result<User, StoreError>;

    fn get_user(&self, id: &UserId) -> Result<User, StoreError>;

    fn get_organization(&self, id: &OrganizationId) -> Result<Organization, StoreError>;

    /// Organizations `user` is responsible for.
    fn organizations_of(&self, user: &UserId) -> Result<Vec<OrganizationId>, StoreError>;

    fn responsible_users(&self, org: &OrganizationId) -> Result<Vec<UserId>, StoreError>;

    /// Insert or replace a user. A username held by another id is `Duplicate`.
    fn put_user(&self, user: &User) -> Result<(), StoreError>;

    fn put_organization(&self, org: &Organization) -> Result<(), StoreError>;

    /// Make `user` responsible for `org`. Both must exist. Idempotent.
    fn put_responsible(&self, org: &OrganizationId, user: &UserId) -> Result<(), StoreError>;
}
