//! Placement store.
//!
//! # Responsibility
//! - Create, move and delete placements on parcels.
//! - Keep poly catalog entries alive exactly as long as a placement uses them.
//!
//! # Invariants
//! - Every mutation re-reads the parcel and requires its owner's authority;
//!   moving to another parcel also requires the destination owner's.
//! - Delete removes the row first, then checks the source index, so the
//!   check never sees the placement being deleted.

use crate::auth::{require_auth, Authority};
use crate::error::{RegistryResult, ValidationError};
use crate::model::account::AccountName;
use crate::model::catalog::CatalogId;
use crate::model::parcel::ParcelId;
use crate::model::placement::{Placement, PlacementId, SourceKey, SourceKind, Transform};
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::land_repo::LandRepository;
use crate::repo::placement_repo::PlacementRepository;
use crate::service::catalog_service::CatalogService;

/// Request to place a poly asset on a parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub parcel_id: ParcelId,
    pub poly_id: String,
    pub transform: Transform,
}

/// New parcel and transform for an existing placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementUpdate {
    pub parcel_id: ParcelId,
    pub transform: Transform,
}

pub struct PlacementService<'cfg, P, L, C>
where
    P: PlacementRepository,
    L: LandRepository,
    C: CatalogRepository,
{
    placements: P,
    lands: L,
    catalog: CatalogService<'cfg, C>,
}

impl<'cfg, P, L, C> PlacementService<'cfg, P, L, C>
where
    P: PlacementRepository,
    L: LandRepository,
    C: CatalogRepository,
{
    pub fn new(placements: P, lands: L, catalog: CatalogService<'cfg, C>) -> Self {
        Self {
            placements,
            lands,
            catalog,
        }
    }

    /// Places `request.poly_id` on the parcel, billed to the parcel owner.
    pub fn persist_placement(
        &self,
        auth: &impl Authority,
        request: &PlacementRequest,
    ) -> RegistryResult<PlacementId> {
        let owner = self.require_land_owner_auth(auth, request.parcel_id)?;
        request.transform.validate()?;

        let catalog_id = self
            .catalog
            .resolve_or_create(auth, &owner, &request.poly_id)?;

        let placement = Placement {
            id: self.placements.next_placement_id()?,
            parcel_id: request.parcel_id,
            source: SourceKey::poly(catalog_id),
            transform: request.transform,
            payer: owner,
        };
        self.placements.insert_placement(&placement)?;
        Ok(placement.id)
    }

    /// Moves and/or re-poses a placement. Source and payer stay unchanged.
    pub fn update_placement(
        &self,
        auth: &impl Authority,
        placement_id: PlacementId,
        update: &PlacementUpdate,
    ) -> RegistryResult<()> {
        let current = self.require_placement(placement_id)?;
        self.require_land_owner_auth(auth, current.parcel_id)?;
        if update.parcel_id != current.parcel_id {
            self.require_land_owner_auth(auth, update.parcel_id)?;
        }
        update.transform.validate()?;

        self.placements.update_placement_location(
            placement_id,
            update.parcel_id,
            &update.transform,
        )
    }

    /// Deletes a placement; returns the evicted catalog id, if any.
    pub fn delete_placement(
        &self,
        auth: &impl Authority,
        placement_id: PlacementId,
    ) -> RegistryResult<Option<CatalogId>> {
        let placement = self.require_placement(placement_id)?;
        self.require_land_owner_auth(auth, placement.parcel_id)?;
        self.placements.delete_placement(placement_id)?;

        if placement.source.kind != SourceKind::Poly
            || self.placements.source_in_use(placement.source)?
        {
            return Ok(None);
        }

        self.catalog.evict(placement.source.id)?;
        Ok(Some(placement.source.id))
    }

    pub fn get_placement(&self, id: PlacementId) -> RegistryResult<Option<Placement>> {
        self.placements.get_placement(id)
    }

    pub fn list_placements_for_parcel(
        &self,
        parcel_id: ParcelId,
    ) -> RegistryResult<Vec<Placement>> {
        self.placements.list_placements_for_parcel(parcel_id)
    }

    fn require_placement(&self, id: PlacementId) -> RegistryResult<Placement> {
        self.placements
            .get_placement(id)?
            .ok_or_else(|| ValidationError::PlacementNotFound(id).into())
    }

    fn require_land_owner_auth(
        &self,
        auth: &impl Authority,
        parcel_id: ParcelId,
    ) -> RegistryResult<AccountName> {
        let parcel = self
            .lands
            .get_land(parcel_id)?
            .ok_or(ValidationError::ParcelNotFound(parcel_id))?;
        require_auth(auth, &parcel.owner)?;
        Ok(parcel.owner)
    }
}
