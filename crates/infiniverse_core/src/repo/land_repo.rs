//! Parcel repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `lands_by_north_edge` returns rows ordered by `lat_north_edge ASC, id ASC`
//!   using the `idx_lands_lat_north` index.
//! - `registry_meta.max_lat_span` is never smaller than the latitude span of
//!   any stored parcel.

use crate::error::{RegistryError, RegistryResult};
use crate::model::account::AccountName;
use crate::model::parcel::{LandBounds, Parcel, ParcelId};
use crate::repo::{available_primary_key, parse_account};
use rusqlite::{params, Connection, OptionalExtension, Row};

const LAND_SELECT_SQL: &str = "SELECT
    id,
    owner,
    lat_north_edge,
    long_east_edge,
    lat_south_edge,
    long_west_edge,
    reg_end_date
FROM lands";

const MAX_LAT_SPAN_KEY: &str = "max_lat_span";

/// Repository interface for parcel storage.
pub trait LandRepository {
    fn next_land_id(&self) -> RegistryResult<ParcelId>;
    fn insert_land(&self, parcel: &Parcel, payer: &AccountName) -> RegistryResult<()>;
    fn get_land(&self, id: ParcelId) -> RegistryResult<Option<Parcel>>;
    /// Parcels whose north edge lies in `[lower, upper)`.
    fn lands_by_north_edge(&self, lower: f64, upper: f64) -> RegistryResult<Vec<Parcel>>;
    fn list_lands_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<Parcel>>;
    /// Largest latitude span of any stored parcel, `0.0` when empty.
    fn max_lat_span(&self) -> RegistryResult<f64>;
    /// Raises the recorded maximum span to at least `span`.
    fn record_lat_span(&self, span: f64) -> RegistryResult<()>;
}

/// SQLite-backed parcel repository.
pub struct SqliteLandRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLandRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LandRepository for SqliteLandRepository<'_> {
    fn next_land_id(&self) -> RegistryResult<ParcelId> {
        available_primary_key(self.conn, "lands")
    }

    fn insert_land(&self, parcel: &Parcel, payer: &AccountName) -> RegistryResult<()> {
        self.conn.execute(
            "INSERT INTO lands (
                id,
                owner,
                lat_north_edge,
                long_east_edge,
                lat_south_edge,
                long_west_edge,
                reg_end_date,
                payer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                parcel.id,
                parcel.owner.as_str(),
                parcel.bounds.lat_north,
                parcel.bounds.long_east,
                parcel.bounds.lat_south,
                parcel.bounds.long_west,
                parcel.reg_end_date,
                payer.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_land(&self, id: ParcelId) -> RegistryResult<Option<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LAND_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_land_row(row)?));
        }
        Ok(None)
    }

    fn lands_by_north_edge(&self, lower: f64, upper: f64) -> RegistryResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LAND_SELECT_SQL}
             WHERE lat_north_edge >= ?1
               AND lat_north_edge < ?2
             ORDER BY lat_north_edge ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![lower, upper])?;
        let mut lands = Vec::new();
        while let Some(row) = rows.next()? {
            lands.push(parse_land_row(row)?);
        }
        Ok(lands)
    }

    fn list_lands_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LAND_SELECT_SQL}
             WHERE owner = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut lands = Vec::new();
        while let Some(row) = rows.next()? {
            lands.push(parse_land_row(row)?);
        }
        Ok(lands)
    }

    fn max_lat_span(&self) -> RegistryResult<f64> {
        let span = self
            .conn
            .query_row(
                "SELECT value FROM registry_meta WHERE key = ?1;",
                [MAX_LAT_SPAN_KEY],
                |row| row.get::<_, f64>(0),
            )
            .optional()?;
        Ok(span.unwrap_or(0.0))
    }

    fn record_lat_span(&self, span: f64) -> RegistryResult<()> {
        self.conn.execute(
            "INSERT INTO registry_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = MAX(value, excluded.value);",
            params![MAX_LAT_SPAN_KEY, span],
        )?;
        Ok(())
    }
}

fn parse_land_row(row: &Row<'_>) -> RegistryResult<Parcel> {
    let id: ParcelId = row.get("id")?;
    let bounds = LandBounds::new(
        row.get("lat_north_edge")?,
        row.get("long_east_edge")?,
        row.get("lat_south_edge")?,
        row.get("long_west_edge")?,
    );
    bounds.validate().map_err(|err| {
        RegistryError::InvalidData(format!("land {id} has invalid bounds: {err}"))
    })?;

    Ok(Parcel {
        id,
        owner: parse_account(row.get("owner")?, "lands.owner")?,
        bounds,
        reg_end_date: row.get("reg_end_date")?,
    })
}
