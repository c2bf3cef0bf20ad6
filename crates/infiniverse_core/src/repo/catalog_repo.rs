//! Poly catalog repository contracts and SQLite implementation.
//!
//! # Invariants
//! - At most one row per `(owner, poly_id)`; enforced by callers scanning
//!   the owner bucket before insert, not by a unique index.

use crate::error::RegistryResult;
use crate::model::account::AccountName;
use crate::model::catalog::{CatalogEntry, CatalogId};
use crate::repo::{available_primary_key, parse_account};
use rusqlite::{params, Connection, Row};

/// Repository interface for the shared poly catalog.
pub trait CatalogRepository {
    fn next_catalog_id(&self) -> RegistryResult<CatalogId>;
    fn insert_entry(&self, entry: &CatalogEntry, payer: &AccountName) -> RegistryResult<()>;
    fn get_entry(&self, id: CatalogId) -> RegistryResult<Option<CatalogEntry>>;
    /// All entries of one owner, in id order (the owner bucket).
    fn list_entries_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<CatalogEntry>>;
    /// Deletes one entry; returns whether a row was removed.
    fn delete_entry(&self, id: CatalogId) -> RegistryResult<bool>;
}

/// SQLite-backed poly catalog.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn next_catalog_id(&self) -> RegistryResult<CatalogId> {
        available_primary_key(self.conn, "polys")
    }

    fn insert_entry(&self, entry: &CatalogEntry, payer: &AccountName) -> RegistryResult<()> {
        self.conn.execute(
            "INSERT INTO polys (id, owner, poly_id, payer) VALUES (?1, ?2, ?3, ?4);",
            params![
                entry.id,
                entry.owner.as_str(),
                entry.poly_id.as_str(),
                payer.as_str()
            ],
        )?;
        Ok(())
    }

    fn get_entry(&self, id: CatalogId) -> RegistryResult<Option<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, owner, poly_id FROM polys WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn list_entries_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, poly_id
             FROM polys
             WHERE owner = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, id: CatalogId) -> RegistryResult<bool> {
        let changed = self.conn.execute("DELETE FROM polys WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RegistryResult<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.get("id")?,
        owner: parse_account(row.get("owner")?, "polys.owner")?,
        poly_id: row.get("poly_id")?,
    })
}
