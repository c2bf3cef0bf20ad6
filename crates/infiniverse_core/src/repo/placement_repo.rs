//! Placement repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(source_kind, source_id)` is looked up through the
//!   `idx_persistents_source` compound index.
//! - `source_*` and `payer` columns are written once, at insert.

use crate::error::{RegistryError, RegistryResult};
use crate::model::parcel::ParcelId;
use crate::model::placement::{
    Placement, PlacementId, SourceKey, SourceKind, Transform, Vector3,
};
use crate::repo::{available_primary_key, parse_account};
use rusqlite::{params, Connection, Row};

const PLACEMENT_SELECT_SQL: &str = "SELECT
    id,
    land_id,
    source_kind,
    source_id,
    position_x,
    position_y,
    position_z,
    orientation_x,
    orientation_y,
    orientation_z,
    scale_x,
    scale_y,
    scale_z,
    payer
FROM persistents";

/// Repository interface for placements.
pub trait PlacementRepository {
    fn next_placement_id(&self) -> RegistryResult<PlacementId>;
    fn insert_placement(&self, placement: &Placement) -> RegistryResult<()>;
    fn get_placement(&self, id: PlacementId) -> RegistryResult<Option<Placement>>;
    /// Moves a placement and replaces its transform in place.
    fn update_placement_location(
        &self,
        id: PlacementId,
        parcel_id: ParcelId,
        transform: &Transform,
    ) -> RegistryResult<()>;
    fn delete_placement(&self, id: PlacementId) -> RegistryResult<()>;
    /// True when any stored placement still references `source`.
    fn source_in_use(&self, source: SourceKey) -> RegistryResult<bool>;
    fn list_placements_for_parcel(&self, parcel_id: ParcelId) -> RegistryResult<Vec<Placement>>;
}

/// SQLite-backed placement repository.
pub struct SqlitePlacementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlacementRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlacementRepository for SqlitePlacementRepository<'_> {
    fn next_placement_id(&self) -> RegistryResult<PlacementId> {
        available_primary_key(self.conn, "persistents")
    }

    fn insert_placement(&self, placement: &Placement) -> RegistryResult<()> {
        let Transform {
            position,
            orientation,
            scale,
        } = placement.transform;
        self.conn.execute(
            "INSERT INTO persistents (
                id,
                land_id,
                source_kind,
                source_id,
                position_x,
                position_y,
                position_z,
                orientation_x,
                orientation_y,
                orientation_z,
                scale_x,
                scale_y,
                scale_z,
                payer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                placement.id,
                placement.parcel_id,
                placement.source.kind.code(),
                placement.source.id,
                position.x,
                position.y,
                position.z,
                orientation.x,
                orientation.y,
                orientation.z,
                scale.x,
                scale.y,
                scale.z,
                placement.payer.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_placement(&self, id: PlacementId) -> RegistryResult<Option<Placement>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLACEMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_placement_row(row)?));
        }
        Ok(None)
    }

    fn update_placement_location(
        &self,
        id: PlacementId,
        parcel_id: ParcelId,
        transform: &Transform,
    ) -> RegistryResult<()> {
        let changed = self.conn.execute(
            "UPDATE persistents
             SET
                land_id = ?2,
                position_x = ?3,
                position_y = ?4,
                position_z = ?5,
                orientation_x = ?6,
                orientation_y = ?7,
                orientation_z = ?8,
                scale_x = ?9,
                scale_y = ?10,
                scale_z = ?11
             WHERE id = ?1;",
            params![
                id,
                parcel_id,
                transform.position.x,
                transform.position.y,
                transform.position.z,
                transform.orientation.x,
                transform.orientation.y,
                transform.orientation.z,
                transform.scale.x,
                transform.scale.y,
                transform.scale.z,
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::InvalidData(format!(
                "persistent {id} vanished during update"
            )));
        }
        Ok(())
    }

    fn delete_placement(&self, id: PlacementId) -> RegistryResult<()> {
        self.conn
            .execute("DELETE FROM persistents WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn source_in_use(&self, source: SourceKey) -> RegistryResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM persistents
                WHERE source_kind = ?1 AND source_id = ?2
            );",
            params![source.kind.code(), source.id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_placements_for_parcel(&self, parcel_id: ParcelId) -> RegistryResult<Vec<Placement>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLACEMENT_SELECT_SQL}
             WHERE land_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([parcel_id])?;
        let mut placements = Vec::new();
        while let Some(row) = rows.next()? {
            placements.push(parse_placement_row(row)?);
        }
        Ok(placements)
    }
}

fn parse_placement_row(row: &Row<'_>) -> RegistryResult<Placement> {
    let id: PlacementId = row.get("id")?;
    let transform = Transform::new(
        Vector3::new(
            row.get("position_x")?,
            row.get("position_y")?,
            row.get("position_z")?,
        ),
        Vector3::new(
            row.get("orientation_x")?,
            row.get("orientation_y")?,
            row.get("orientation_z")?,
        ),
        Vector3::new(row.get("scale_x")?, row.get("scale_y")?, row.get("scale_z")?),
    );
    transform.validate().map_err(|err| {
        RegistryError::InvalidData(format!("persistent {id} has invalid transform: {err}"))
    })?;

    Ok(Placement {
        id,
        parcel_id: row.get("land_id")?,
        source: SourceKey {
            kind: SourceKind::from_code(row.get("source_kind")?),
            id: row.get("source_id")?,
        },
        transform,
        payer: parse_account(row.get("payer")?, "persistents.payer")?,
    })
}
