//! Append-only registry of discovered accounts.

use chrono::{DateTime, Utc};
use keeper_core::AccountId;
use std::collections::HashMap;

/// One tracked account and when it was first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHandle {
    id: AccountId,
    discovered_at: DateTime<Utc>,
}

impl AccountHandle {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            discovered_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn discovered_at(&self) -> DateTime<Utc> {
        self.discovered_at
    }
}

/// Accounts the keeper tracks. Accounts are only ever added: an account
/// that leaves the exchange's listing stays registered, its feed simply
/// goes quiet.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, AccountHandle>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.accounts.contains_key(account)
    }

    /// Insert a newly discovered account. Returns false if it was already
    /// tracked; the existing handle keeps its discovery time.
    pub fn insert(&mut self, handle: AccountHandle) -> bool {
        use std::collections::hash_map::Entry;
        match self.accounts.entry(handle.id().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Iterate over tracked accounts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountHandle> {
        self.accounts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> AccountId {
        AccountId::parse(name).unwrap()
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut registry = AccountRegistry::new();
        let first = AccountHandle::new(account("aa01"));
        let seen_at = first.discovered_at();

        assert!(registry.insert(first));
        assert!(!registry.insert(AccountHandle::new(account("aa01"))));
        assert_eq!(registry.len(), 1);

        let kept = registry.iter().next().unwrap();
        assert_eq!(kept.discovered_at(), seen_at);
    }

    #[test]
    fn test_contains() {
        let mut registry = AccountRegistry::new();
        registry.insert(AccountHandle::new(account("aa01")));

        assert!(registry.contains(&account("aa01")));
        assert!(!registry.contains(&account("bb02")));
    }
}
