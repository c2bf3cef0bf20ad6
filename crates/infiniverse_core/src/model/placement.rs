//! Placement (persistent object) domain model.
//!
//! # Invariants
//! - Position is parcel-local: `x, z ∈ (0, 1)` and `y == 0`.
//! - Orientation components are degrees in `[0, 360)`.
//! - Scale components are at least `0.2`.
//! - `source` never changes after creation.

use crate::error::ValidationError;
use crate::model::account::AccountName;
use crate::model::parcel::ParcelId;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Sequential placement identifier.
pub type PlacementId = u64;

pub const MIN_SCALE: f64 = 0.2;
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Three-component vector used for position, orientation and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn components(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Where the placed asset comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Shared catalog (poly) asset; reference-counted through placements.
    Poly,
    /// Any other externally-authored source, identified by its tag.
    /// Tag `0` is reserved for `Poly`.
    Other(NonZeroU64),
}

const SOURCE_KIND_POLY: u64 = 0;

impl SourceKind {
    pub fn from_code(code: u64) -> Self {
        NonZeroU64::new(code).map_or(Self::Poly, Self::Other)
    }

    pub fn code(self) -> u64 {
        match self {
            Self::Poly => SOURCE_KIND_POLY,
            Self::Other(tag) => tag.get(),
        }
    }
}

/// Compound `(kind, source-specific id)` reference of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    pub kind: SourceKind,
    pub id: u64,
}

impl SourceKey {
    pub fn poly(id: u64) -> Self {
        Self {
            kind: SourceKind::Poly,
            id,
        }
    }

    /// 128-bit export form: kind in the high 64 bits, id in the low 64 bits.
    pub fn packed(self) -> u128 {
        (u128::from(self.kind.code()) << 64) | u128::from(self.id)
    }

    pub fn from_packed(value: u128) -> Self {
        Self {
            kind: SourceKind::from_code((value >> 64) as u64),
            id: value as u64,
        }
    }
}

/// Position, orientation and scale of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub orientation: Vector3,
    pub scale: Vector3,
}

impl Transform {
    pub fn new(position: Vector3, orientation: Vector3, scale: Vector3) -> Self {
        Self {
            position,
            orientation,
            scale,
        }
    }

    /// Rejects transforms that leave the parcel surface or degenerate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let p = self.position;
        if !(p.x > 0.0 && p.x < 1.0 && p.z > 0.0 && p.z < 1.0 && p.y == 0.0) {
            return Err(ValidationError::PositionOutOfBounds);
        }

        if !self
            .orientation
            .components()
            .iter()
            .all(|angle| (0.0..FULL_TURN_DEGREES).contains(angle))
        {
            return Err(ValidationError::OrientationOutOfBounds);
        }

        if !self.scale.components().iter().all(|s| *s >= MIN_SCALE) {
            return Err(ValidationError::ScaleOutOfBounds);
        }

        Ok(())
    }
}

/// Stored placement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub parcel_id: ParcelId,
    pub source: SourceKey,
    pub transform: Transform,
    /// Account billed for the row; unchanged by parcel reassignment.
    pub payer: AccountName,
}
