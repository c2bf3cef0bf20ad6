//! Balance (deposit) repository contracts and SQLite implementation.

use crate::error::{RegistryError, RegistryResult};
use crate::model::account::AccountName;
use crate::model::balance::Balance;
use crate::model::quantity::{Quantity, Symbol};
use crate::repo::parse_account;
use rusqlite::{params, Connection};

/// Repository interface for prepaid balances.
pub trait DepositRepository {
    /// Loads the balance of `owner`; `symbol` supplies the precision.
    fn get_deposit(&self, owner: &AccountName, symbol: &Symbol) -> RegistryResult<Option<Balance>>;
    fn insert_deposit(
        &self,
        owner: &AccountName,
        symbol: &Symbol,
        payer: &AccountName,
    ) -> RegistryResult<()>;
    fn set_deposit_amount(&self, owner: &AccountName, amount: i64) -> RegistryResult<()>;
    fn delete_deposit(&self, owner: &AccountName) -> RegistryResult<()>;
}

/// SQLite-backed balance repository.
pub struct SqliteDepositRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepositRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepositRepository for SqliteDepositRepository<'_> {
    fn get_deposit(&self, owner: &AccountName, symbol: &Symbol) -> RegistryResult<Option<Balance>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner, balance, symbol
             FROM deposits
             WHERE owner = ?1;",
        )?;
        let mut rows = stmt.query([owner.as_str()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let stored_code: String = row.get("symbol")?;
        if stored_code != symbol.code {
            return Err(RegistryError::InvalidData(format!(
                "deposit of {owner} is tagged `{stored_code}`, expected `{}`",
                symbol.code
            )));
        }
        let amount: i64 = row.get("balance")?;
        if amount < 0 {
            return Err(RegistryError::InvalidData(format!(
                "negative balance {amount} in deposits.balance"
            )));
        }

        Ok(Some(Balance {
            owner: parse_account(row.get("owner")?, "deposits.owner")?,
            quantity: Quantity::new(amount, symbol.clone()),
        }))
    }

    fn insert_deposit(
        &self,
        owner: &AccountName,
        symbol: &Symbol,
        payer: &AccountName,
    ) -> RegistryResult<()> {
        self.conn.execute(
            "INSERT INTO deposits (owner, balance, symbol, payer) VALUES (?1, 0, ?2, ?3);",
            params![owner.as_str(), symbol.code.as_str(), payer.as_str()],
        )?;
        Ok(())
    }

    fn set_deposit_amount(&self, owner: &AccountName, amount: i64) -> RegistryResult<()> {
        let changed = self.conn.execute(
            "UPDATE deposits SET balance = ?2 WHERE owner = ?1;",
            params![owner.as_str(), amount],
        )?;
        if changed == 0 {
            return Err(RegistryError::InvalidData(format!(
                "deposit of {owner} vanished during update"
            )));
        }
        Ok(())
    }

    fn delete_deposit(&self, owner: &AccountName) -> RegistryResult<()> {
        self.conn
            .execute("DELETE FROM deposits WHERE owner = ?1;", [owner.as_str()])?;
        Ok(())
    }
}
