//! Directory records: users and organizations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::ids::{OrganizationId, UserId};
use crate::time::Timestamp;

/// An employee account; looked up by its unique username.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Timestamp,
}

/// Legal form of an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationKind {
    /// Individual entrepreneur.
    IE,
    LLC,
    JSC,
}

impl OrganizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IE => "IE",
            Self::LLC => "LLC",
            Self::JSC => "JSC",
        }
    }
}

impl fmt::Display for OrganizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizationKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IE" => Ok(Self::IE),
            "LLC" => Ok(Self::LLC),
            "JSC" => Ok(Self::JSC),
            other => Err(ParseError::OrganizationKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    pub kind: OrganizationKind,
    pub created_at: Timestamp,
}
