//! Core state transitions for the Infiniverse land registry.
//! This crate is the single source of truth for parcel, balance, catalog and
//! placement invariants.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{require_auth, Authority, Signers};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, RegistryConfig};
pub use error::{RegistryError, RegistryResult, ValidationError};
pub use ledger::{LogTransferSink, RecordingTransferSink, Transfer, TransferSink};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::AccountName;
pub use model::balance::Balance;
pub use model::catalog::{CatalogEntry, CatalogId};
pub use model::parcel::{LandBounds, Parcel, ParcelId};
pub use model::placement::{
    Placement, PlacementId, SourceKey, SourceKind, Transform, Vector3,
};
pub use model::quantity::{Quantity, Symbol};
pub use service::balance_service::CreditOutcome;
pub use service::land_service::{registration_fee, LandRequest};
pub use service::placement_service::{PlacementRequest, PlacementUpdate};
pub use service::registry::Registry;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
