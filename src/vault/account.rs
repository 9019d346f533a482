//! Account types stored inside the vault.
//!
//! `Account` is what callers see and pass in: website, username and
//! password.  `AccountRecord` is what lives in the encrypted payload; it
//! adds a stable internal id and timestamps.  Both wipe their strings
//! when dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::hostname::normalize_website;
use crate::errors::{SencryptError, Result};

/// A site credential as exchanged with the caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    pub website: String,
    pub username: String,
    pub password: String,
}

impl Account {
    pub fn new(
        website: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Return a copy with `website` normalized to its host token,
    /// rejecting any field that is (or normalizes to) empty.
    pub fn normalized(&self) -> Result<Self> {
        let website = normalize_website(&self.website)?;
        if website.is_empty() {
            return Err(SencryptError::InvalidAccount(format!(
                "'{}' does not contain a website name",
                self.website.trim()
            )));
        }
        if self.username.is_empty() {
            return Err(SencryptError::InvalidAccount(
                "username cannot be empty".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(SencryptError::InvalidAccount(
                "password cannot be empty".into(),
            ));
        }
        Ok(Self {
            website,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("website", &self.website)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// A single account as persisted in the encrypted record set.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AccountRecord {
    /// Internal identity; never shown to callers, who address by index.
    #[zeroize(skip)]
    pub id: Uuid,

    /// Normalized host token (see `hostname`).
    pub website: String,

    pub username: String,

    pub password: String,

    /// When this account was first created.
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,

    /// When this account was last updated.
    #[zeroize(skip)]
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Build a new record from an already normalized account.
    pub fn new(account: &Account) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            website: account.website.clone(),
            username: account.username.clone(),
            password: account.password.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A copy carrying `account`'s fields, keeping id and `created_at`.
    pub fn updated_with(&self, account: &Account) -> Self {
        Self {
            id: self.id,
            website: account.website.clone(),
            username: account.username.clone(),
            password: account.password.clone(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    /// True if this record has the same `(website, username)` identity.
    pub fn same_identity(&self, account: &Account) -> bool {
        self.website == account.website && self.username == account.username
    }

    /// The caller-facing view of this record.
    pub fn to_account(&self) -> Account {
        Account::new(
            self.website.clone(),
            self.username.clone(),
            self.password.clone(),
        )
    }
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("website", &self.website)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_strips_url_parts() {
        let account = Account::new("https://www.example.com/login", "alice", "p1");
        let normalized = account.normalized().unwrap();
        assert_eq!(normalized.website, "example.com");
        assert_eq!(normalized.username, "alice");
        assert_eq!(normalized.password, "p1");
    }

    #[test]
    fn normalized_rejects_empty_fields() {
        assert!(Account::new("", "u", "p").normalized().is_err());
        assert!(Account::new("/only/path", "u", "p").normalized().is_err());
        assert!(Account::new("example.com", "", "p").normalized().is_err());
        assert!(Account::new("example.com", "u", "").normalized().is_err());
    }

    #[test]
    fn update_preserves_identity_and_created_at() {
        let record = AccountRecord::new(&Account::new("a.com", "u", "p"));
        let updated = record.updated_with(&Account::new("b.com", "v", "q"));
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.created_at, record.created_at);
        assert_eq!(updated.website, "b.com");
        assert!(updated.updated_at >= record.updated_at);
    }

    #[test]
    fn debug_never_prints_password() {
        let account = Account::new("example.com", "alice", "hunter2");
        let record = AccountRecord::new(&account);
        assert!(!format!("{account:?}").contains("hunter2"));
        assert!(!format!("{record:?}").contains("hunter2"));
    }
}
