//! Registry error types.
//!
//! # Invariants
//! - Every rejected operation surfaces exactly one `ValidationError` and
//!   leaves storage untouched.
//! - Storage/transport failures stay distinct from validation failures.

use crate::db::DbError;
use crate::model::account::AccountName;
use crate::model::parcel::ParcelId;
use crate::model::placement::PlacementId;
use crate::model::quantity::{Quantity, Symbol};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Domain rule violation. The operation is discarded as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Caller did not prove control of the account.
    MissingAuthority(AccountName),
    InvalidAccountName(String),
    NonFiniteCoordinate,
    LatitudeOrder,
    LongitudeOrder,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
    LandTooLarge {
        max_length_m: u32,
    },
    LandIntersects {
        existing: ParcelId,
    },
    FeeOverflow,
    NoBalanceOpened(AccountName),
    BalanceTooLow {
        required: Quantity,
        available: Quantity,
    },
    BalanceOverflow(AccountName),
    SymbolMismatch {
        expected: Symbol,
        actual: Symbol,
    },
    NonPositiveQuantity,
    InvalidPolyId(String),
    ParcelNotFound(ParcelId),
    PlacementNotFound(PlacementId),
    PositionOutOfBounds,
    OrientationOutOfBounds,
    ScaleOutOfBounds,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuthority(account) => write!(f, "missing authority of {account}"),
            Self::InvalidAccountName(value) => write!(f, "invalid account name `{value}`"),
            Self::NonFiniteCoordinate => write!(f, "land edges must be finite numbers"),
            Self::LatitudeOrder => write!(
                f,
                "north edge must have greater latitude than south edge"
            ),
            Self::LongitudeOrder => {
                write!(f, "east edge must have greater longitude than west edge")
            }
            Self::LatitudeOutOfRange => {
                write!(f, "latitude must be between -85 and 85 degrees")
            }
            Self::LongitudeOutOfRange => {
                write!(f, "longitude must be between -180 and 180 degrees")
            }
            Self::LandTooLarge { max_length_m } => write!(
                f,
                "land cannot exceed a length of {max_length_m} meters on either side"
            ),
            Self::LandIntersects { existing } => write!(
                f,
                "intersecting land has already been registered (land {existing})"
            ),
            Self::FeeOverflow => write!(f, "registration fee does not fit the currency range"),
            Self::NoBalanceOpened(owner) => {
                write!(f, "user {owner} does not have a deposit opened")
            }
            Self::BalanceTooLow {
                required,
                available,
            } => write!(
                f,
                "deposit balance is too low: required {required}, available {available}"
            ),
            Self::BalanceOverflow(owner) => write!(f, "deposit balance of {owner} would overflow"),
            Self::SymbolMismatch { expected, actual } => {
                write!(f, "the symbol does not match: expected {expected}, got {actual}")
            }
            Self::NonPositiveQuantity => write!(f, "the amount must be positive"),
            Self::InvalidPolyId(value) => write!(f, "poly id format is invalid: `{value}`"),
            Self::ParcelNotFound(id) => write!(f, "land id {id} does not exist"),
            Self::PlacementNotFound(id) => write!(f, "persistent id {id} does not exist"),
            Self::PositionOutOfBounds => write!(f, "asset position is not within land bounds"),
            Self::OrientationOutOfBounds => {
                write!(f, "asset orientation must be within 0 and 360")
            }
            Self::ScaleOutOfBounds => write!(f, "asset scale must be at least 0.2"),
        }
    }
}

impl Error for ValidationError {}

/// Error returned by every registry operation.
#[derive(Debug)]
pub enum RegistryError {
    Validation(ValidationError),
    Db(DbError),
    /// Persisted row cannot be decoded into a valid model value.
    InvalidData(String),
}

impl RegistryError {
    /// Short stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Db(_) => "db",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted registry data: {message}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RegistryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
