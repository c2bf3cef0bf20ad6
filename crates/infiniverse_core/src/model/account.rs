//! Account name model.
//!
//! # Invariants
//! - Names are 1-12 characters from `a-z`, `1-5` and `.`.
//! - Names never end with `.`.

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static ACCOUNT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z1-5.]{0,11}[a-z1-5]$").expect("valid account name regex"));

/// Ledger account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Parses and validates an account name.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !ACCOUNT_NAME_RE.is_match(&value) {
            return Err(ValidationError::InvalidAccountName(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountName> for String {
    fn from(value: AccountName) -> Self {
        value.0
    }
}
