//! Shared poly asset catalog.
//!
//! # Invariants
//! - `resolve_or_create` is idempotent per `(owner, poly_id)`.
//! - `evict` is only called once no placement references the entry.

use crate::auth::{require_auth, Authority};
use crate::config::RegistryConfig;
use crate::error::{RegistryResult, ValidationError};
use crate::model::account::AccountName;
use crate::model::catalog::{CatalogEntry, CatalogId};
use crate::repo::catalog_repo::CatalogRepository;
use log::debug;

pub struct CatalogService<'cfg, C: CatalogRepository> {
    catalog: C,
    config: &'cfg RegistryConfig,
}

impl<'cfg, C: CatalogRepository> CatalogService<'cfg, C> {
    pub fn new(catalog: C, config: &'cfg RegistryConfig) -> Self {
        Self { catalog, config }
    }

    /// Returns the catalog id for `(owner, poly_id)`, creating it if needed.
    ///
    /// A new entry is billed to `owner`.
    pub fn resolve_or_create(
        &self,
        auth: &impl Authority,
        owner: &AccountName,
        poly_id: &str,
    ) -> RegistryResult<CatalogId> {
        require_auth(auth, owner)?;
        // Length is measured in bytes.
        if poly_id.len() != self.config.poly_id_len {
            return Err(ValidationError::InvalidPolyId(poly_id.to_string()).into());
        }

        if let Some(existing) = self
            .catalog
            .list_entries_by_owner(owner)?
            .into_iter()
            .find(|entry| entry.poly_id == poly_id)
        {
            return Ok(existing.id);
        }

        let entry = CatalogEntry {
            id: self.catalog.next_catalog_id()?,
            owner: owner.clone(),
            poly_id: poly_id.to_string(),
        };
        self.catalog.insert_entry(&entry, owner)?;
        debug!(
            "event=catalog_entry_created module=catalog status=ok catalog_id={} owner={}",
            entry.id, entry.owner
        );
        Ok(entry.id)
    }

    /// Deletes the entry unconditionally.
    pub fn evict(&self, id: CatalogId) -> RegistryResult<bool> {
        let removed = self.catalog.delete_entry(id)?;
        debug!(
            "event=catalog_entry_evicted module=catalog status=ok catalog_id={} removed={}",
            id, removed
        );
        Ok(removed)
    }

    pub fn get_entry(&self, id: CatalogId) -> RegistryResult<Option<CatalogEntry>> {
        self.catalog.get_entry(id)
    }

    pub fn list_entries_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<CatalogEntry>> {
        self.catalog.list_entries_by_owner(owner)
    }
}
