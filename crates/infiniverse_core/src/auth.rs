//! Caller authority checks.
//!
//! The registry never verifies signatures itself: the embedding host proves
//! which accounts the caller controls and hands that proof in as an
//! [`Authority`].

use crate::error::ValidationError;
use crate::model::account::AccountName;
use std::collections::BTreeSet;

/// Capability proof: answers "did the caller prove control of `account`".
pub trait Authority {
    fn has_auth(&self, account: &AccountName) -> bool;
}

/// Fails with `MissingAuthority` unless `auth` covers `account`.
pub fn require_auth(auth: &impl Authority, account: &AccountName) -> Result<(), ValidationError> {
    if auth.has_auth(account) {
        Ok(())
    } else {
        Err(ValidationError::MissingAuthority(account.clone()))
    }
}

/// Set of accounts whose signatures accompanied the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signers {
    accounts: BTreeSet<AccountName>,
}

impl Signers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(account: AccountName) -> Self {
        Self::new().with(account)
    }

    pub fn with(mut self, account: AccountName) -> Self {
        self.accounts.insert(account);
        self
    }
}

impl Authority for Signers {
    fn has_auth(&self, account: &AccountName) -> bool {
        self.accounts.contains(account)
    }
}
