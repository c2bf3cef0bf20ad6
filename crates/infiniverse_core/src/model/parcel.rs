//! Parcel (land) domain model.
//!
//! # Invariants
//! - `lat_north > lat_south` and `long_east > long_west`; parcels never span
//!   the antimeridian.
//! - Latitudes stay inside `(-85, 85)`, longitudes inside `(-180, 180]`.
//! - Parcels are immutable once registered.

use crate::error::ValidationError;
use crate::model::account::AccountName;
use serde::{Deserialize, Serialize};

/// Sequential parcel identifier.
pub type ParcelId = u64;

/// Latitude limit in degrees, exclusive on both sides.
pub const MAX_ABS_LATITUDE: f64 = 85.0;

/// Axis-aligned lat/long rectangle, edges in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandBounds {
    pub lat_north: f64,
    pub long_east: f64,
    pub lat_south: f64,
    pub long_west: f64,
}

impl LandBounds {
    pub fn new(lat_north: f64, long_east: f64, lat_south: f64, long_west: f64) -> Self {
        Self {
            lat_north,
            long_east,
            lat_south,
            long_west,
        }
    }

    /// Checks edge ordering and coordinate ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let edges = [
            self.lat_north,
            self.long_east,
            self.lat_south,
            self.long_west,
        ];
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(ValidationError::NonFiniteCoordinate);
        }
        if self.lat_north <= self.lat_south {
            return Err(ValidationError::LatitudeOrder);
        }
        if self.long_east <= self.long_west {
            return Err(ValidationError::LongitudeOrder);
        }
        if self.lat_north >= MAX_ABS_LATITUDE || self.lat_south <= -MAX_ABS_LATITUDE {
            return Err(ValidationError::LatitudeOutOfRange);
        }
        if !valid_longitude(self.long_east) || !valid_longitude(self.long_west) {
            return Err(ValidationError::LongitudeOutOfRange);
        }
        Ok(())
    }

    /// True when the rectangles share no interior area.
    ///
    /// Touching edges or corners count as disjoint.
    pub fn is_disjoint_from(&self, other: &LandBounds) -> bool {
        other.long_east <= self.long_west
            || other.long_west >= self.long_east
            || other.lat_south >= self.lat_north
            || other.lat_north <= self.lat_south
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_north - self.lat_south
    }
}

fn valid_longitude(value: f64) -> bool {
    value > -180.0 && value <= 180.0
}

/// Registered parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: ParcelId,
    pub owner: AccountName,
    pub bounds: LandBounds,
    /// Registration expiry, unix epoch seconds.
    pub reg_end_date: i64,
}

#[cfg(test)]
mod tests {
    use super::LandBounds;
    use crate::error::ValidationError;

    #[test]
    fn validate_rejects_each_malformed_edge() {
        let cases = [
            (
                LandBounds::new(10.0, 20.0, 10.0, 19.0),
                ValidationError::LatitudeOrder,
            ),
            (
                LandBounds::new(10.0, 20.0, 9.0, 20.0),
                ValidationError::LongitudeOrder,
            ),
            (
                LandBounds::new(85.0, 20.0, 84.9, 19.0),
                ValidationError::LatitudeOutOfRange,
            ),
            (
                LandBounds::new(-84.9, 20.0, -85.0, 19.0),
                ValidationError::LatitudeOutOfRange,
            ),
            (
                LandBounds::new(10.0, 180.5, 9.0, 179.0),
                ValidationError::LongitudeOutOfRange,
            ),
            (
                LandBounds::new(10.0, -179.0, 9.0, -180.0),
                ValidationError::LongitudeOutOfRange,
            ),
            (
                LandBounds::new(f64::NAN, 20.0, 9.0, 19.0),
                ValidationError::NonFiniteCoordinate,
            ),
        ];

        for (bounds, expected) in cases {
            assert_eq!(bounds.validate(), Err(expected), "{bounds:?}");
        }
    }

    #[test]
    fn validate_accepts_longitude_180() {
        LandBounds::new(1.0, 180.0, 0.9999, 179.9999)
            .validate()
            .expect("east edge may equal 180");
    }

    #[test]
    fn shared_edges_and_corners_are_disjoint() {
        let base = LandBounds::new(1.0, 1.0, 0.0, 0.0);
        let east_neighbour = LandBounds::new(1.0, 2.0, 0.0, 1.0);
        let north_neighbour = LandBounds::new(2.0, 1.0, 1.0, 0.0);
        let corner = LandBounds::new(2.0, 2.0, 1.0, 1.0);
        let overlapping = LandBounds::new(1.5, 1.5, 0.5, 0.5);

        assert!(base.is_disjoint_from(&east_neighbour));
        assert!(base.is_disjoint_from(&north_neighbour));
        assert!(base.is_disjoint_from(&corner));
        assert!(!base.is_disjoint_from(&overlapping));
    }
}
