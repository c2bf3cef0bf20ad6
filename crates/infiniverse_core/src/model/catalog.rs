//! Shared poly asset catalog entries.

use crate::model::account::AccountName;
use serde::{Deserialize, Serialize};

/// Dense registry-wide catalog id; may be reused after eviction.
pub type CatalogId = u64;

/// One deduplicated `(owner, poly_id)` asset record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub owner: AccountName,
    /// Opaque external poly identifier.
    pub poly_id: String,
}
