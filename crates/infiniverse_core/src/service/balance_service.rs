//! Balance ledger adapter.
//!
//! # Responsibility
//! - Open/close prepaid balances and apply inbound credit notifications.
//! - Debit registration fees and produce the matching outbound transfers.
//!
//! # Invariants
//! - Balances never go negative; arithmetic is checked.
//! - Credits with foreign routing (`from == self` or `to != self`) are
//!   ignored without error.

use crate::auth::{require_auth, Authority};
use crate::config::RegistryConfig;
use crate::error::{RegistryResult, ValidationError};
use crate::ledger::Transfer;
use crate::model::account::AccountName;
use crate::model::balance::Balance;
use crate::model::quantity::Quantity;
use crate::repo::deposit_repo::DepositRepository;

/// Outcome of an inbound credit notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditOutcome {
    /// Transfer was not addressed to this registry.
    Ignored,
    /// Balance after the credit.
    Credited(Quantity),
}

pub struct BalanceService<'cfg, D: DepositRepository> {
    deposits: D,
    config: &'cfg RegistryConfig,
}

impl<'cfg, D: DepositRepository> BalanceService<'cfg, D> {
    pub fn new(deposits: D, config: &'cfg RegistryConfig) -> Self {
        Self { deposits, config }
    }

    /// Creates a zero balance for `owner` unless one exists.
    ///
    /// Returns `true` when a new balance row was created.
    pub fn open(&self, auth: &impl Authority, owner: &AccountName) -> RegistryResult<bool> {
        require_auth(auth, owner)?;
        let symbol = self.config.symbol();
        if self.deposits.get_deposit(owner, &symbol)?.is_some() {
            return Ok(false);
        }
        self.deposits.insert_deposit(owner, &symbol, owner)?;
        Ok(true)
    }

    /// Removes the balance of `owner`, refunding any remainder.
    pub fn close(
        &self,
        auth: &impl Authority,
        owner: &AccountName,
    ) -> RegistryResult<Option<Transfer>> {
        require_auth(auth, owner)?;
        let balance = self.require_balance(owner)?;

        let refund = balance.quantity.is_positive().then(|| Transfer {
            from: self.config.self_account.clone(),
            to: owner.clone(),
            quantity: balance.quantity.clone(),
            memo: String::new(),
        });

        self.deposits.delete_deposit(owner)?;
        Ok(refund)
    }

    /// Applies an inbound ledger transfer notification.
    pub fn credit(
        &self,
        from: &AccountName,
        to: &AccountName,
        quantity: &Quantity,
    ) -> RegistryResult<CreditOutcome> {
        if *from == self.config.self_account || *to != self.config.self_account {
            return Ok(CreditOutcome::Ignored);
        }

        let expected = self.config.symbol();
        if quantity.symbol != expected {
            return Err(ValidationError::SymbolMismatch {
                expected,
                actual: quantity.symbol.clone(),
            }
            .into());
        }
        if !quantity.is_positive() {
            return Err(ValidationError::NonPositiveQuantity.into());
        }

        let balance = self.require_balance(from)?;
        let updated = balance
            .quantity
            .amount
            .checked_add(quantity.amount)
            .ok_or_else(|| ValidationError::BalanceOverflow(from.clone()))?;
        self.deposits.set_deposit_amount(from, updated)?;
        Ok(CreditOutcome::Credited(Quantity::new(updated, expected)))
    }

    /// Debits `fee` from `owner` and returns the transfer to the treasury.
    pub fn collect_fee(&self, owner: &AccountName, fee: &Quantity) -> RegistryResult<Transfer> {
        let balance = self.require_balance(owner)?;
        if balance.quantity.amount < fee.amount {
            return Err(ValidationError::BalanceTooLow {
                required: fee.clone(),
                available: balance.quantity,
            }
            .into());
        }

        self.deposits
            .set_deposit_amount(owner, balance.quantity.amount - fee.amount)?;
        Ok(Transfer {
            from: self.config.self_account.clone(),
            to: self.config.treasury_account.clone(),
            quantity: fee.clone(),
            memo: String::new(),
        })
    }

    pub fn get_balance(&self, owner: &AccountName) -> RegistryResult<Option<Balance>> {
        self.deposits.get_deposit(owner, &self.config.symbol())
    }

    fn require_balance(&self, owner: &AccountName) -> RegistryResult<Balance> {
        self.get_balance(owner)?
            .ok_or_else(|| ValidationError::NoBalanceOpened(owner.clone()).into())
    }
}
