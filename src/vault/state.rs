//! The decrypted working set of an unlocked session.

use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::account::{Account, AccountRecord};
use crate::errors::{SencryptError, Result};

/// Ordered account records, owned exclusively by the unlocked session.
///
/// Order is insertion order; callers address records by their current
/// position.  Every string is wiped when the state is dropped.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct VaultState {
    records: Vec<AccountRecord>,
}

impl VaultState {
    pub fn new(records: Vec<AccountRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AccountRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Caller-facing copies of every record, in order.
    pub fn accounts(&self) -> Vec<Account> {
        self.records.iter().map(AccountRecord::to_account).collect()
    }

    /// Resolve a caller-supplied index to the record's internal id.
    pub fn id_at(&self, index: usize) -> Result<Uuid> {
        self.records
            .get(index)
            .map(|r| r.id)
            .ok_or(SencryptError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }

    /// Current position of the record with `id`.
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Fail with `DuplicateAccount` if any record other than `except`
    /// already has `account`'s `(website, username)` pair.
    pub fn ensure_unique(&self, account: &Account, except: Option<Uuid>) -> Result<()> {
        let clash = self
            .records
            .iter()
            .filter(|r| Some(r.id) != except)
            .any(|r| r.same_identity(account));

        if clash {
            return Err(SencryptError::DuplicateAccount {
                website: account.website.clone(),
                username: account.username.clone(),
            });
        }
        Ok(())
    }

    /// Swap in a new record sequence; the old one is wiped on drop.
    pub fn replace(&mut self, records: Vec<AccountRecord>) {
        self.records = records;
    }
}
