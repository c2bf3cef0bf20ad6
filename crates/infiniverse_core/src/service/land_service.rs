//! Land registry.
//!
//! # Responsibility
//! - Validate requested parcel rectangles and their metric size.
//! - Enforce non-overlap with a bounded scan over the north-edge index.
//! - Charge the registration fee before inserting the parcel.
//!
//! # Invariants
//! - No two stored parcels share interior area; touching edges are allowed.
//! - The scan window `[lat_south, lat_north + margin)` covers every parcel
//!   that could intersect, because `margin` is at least the recorded maximum
//!   latitude span of stored parcels.
//! - Fee sides are clamped to at least 1 m each.

use crate::auth::{require_auth, Authority};
use crate::config::RegistryConfig;
use crate::error::{RegistryResult, ValidationError};
use crate::geo::{lat_long_to_meters, meters_to_lat_dist};
use crate::ledger::Transfer;
use crate::model::account::AccountName;
use crate::model::parcel::{LandBounds, Parcel, ParcelId};
use crate::model::quantity::Quantity;
use crate::repo::deposit_repo::DepositRepository;
use crate::repo::land_repo::LandRepository;
use crate::service::balance_service::BalanceService;
use log::warn;

const MIN_FEE_SIDE_M: f64 = 1.0;

/// Request to claim one rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct LandRequest {
    pub owner: AccountName,
    pub bounds: LandBounds,
}

/// Committed-to-be parcel plus the fee transfer to forward.
#[derive(Debug, Clone, PartialEq)]
pub struct LandRegistration {
    pub parcel: Parcel,
    pub fee_transfer: Transfer,
}

pub struct LandService<'cfg, L: LandRepository, D: DepositRepository> {
    lands: L,
    balances: BalanceService<'cfg, D>,
    config: &'cfg RegistryConfig,
}

impl<'cfg, L: LandRepository, D: DepositRepository> LandService<'cfg, L, D> {
    pub fn new(lands: L, balances: BalanceService<'cfg, D>, config: &'cfg RegistryConfig) -> Self {
        Self {
            lands,
            balances,
            config,
        }
    }

    /// Registers `request.bounds` for `request.owner`.
    ///
    /// `now` is the registration time in epoch seconds.
    pub fn register_land(
        &self,
        auth: &impl Authority,
        request: &LandRequest,
        now: i64,
    ) -> RegistryResult<LandRegistration> {
        require_auth(auth, &request.owner)?;
        let bounds = request.bounds;
        bounds.validate()?;

        let (north_south, east_west) = lat_long_to_meters(
            bounds.lat_north,
            bounds.lat_south,
            bounds.long_east,
            bounds.long_west,
        );
        let max_length = f64::from(self.config.max_land_length_m);
        if north_south > max_length || east_west > max_length {
            return Err(ValidationError::LandTooLarge {
                max_length_m: self.config.max_land_length_m,
            }
            .into());
        }

        self.ensure_no_intersection(&bounds)?;

        let fee = registration_fee(self.config, north_south, east_west)?;
        let fee_transfer = self.balances.collect_fee(&request.owner, &fee)?;

        let parcel = Parcel {
            id: self.lands.next_land_id()?,
            owner: request.owner.clone(),
            bounds,
            reg_end_date: now.saturating_add(self.config.registration_secs),
        };
        self.lands.insert_land(&parcel, &request.owner)?;
        self.lands.record_lat_span(bounds.lat_span())?;

        Ok(LandRegistration {
            parcel,
            fee_transfer,
        })
    }

    pub fn get_land(&self, id: ParcelId) -> RegistryResult<Option<Parcel>> {
        self.lands.get_land(id)
    }

    pub fn list_lands_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<Parcel>> {
        self.lands.list_lands_by_owner(owner)
    }

    fn ensure_no_intersection(&self, bounds: &LandBounds) -> RegistryResult<()> {
        let size_margin = meters_to_lat_dist(f64::from(self.config.max_land_length_m));
        let recorded_span = self.lands.max_lat_span()?;
        if recorded_span > size_margin {
            warn!(
                "event=land_scan_widened module=land status=warn recorded_span={} size_margin={}",
                recorded_span, size_margin
            );
        }
        let upper_bound = bounds.lat_north + size_margin.max(recorded_span);

        // Lower bound admits `north == lat_south`; the disjoint test drops it.
        for candidate in self
            .lands
            .lands_by_north_edge(bounds.lat_south, upper_bound)?
        {
            if !bounds.is_disjoint_from(&candidate.bounds) {
                return Err(ValidationError::LandIntersects {
                    existing: candidate.id,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Fee in minor units for a parcel of the given side lengths.
pub fn registration_fee(
    config: &RegistryConfig,
    north_south_m: f64,
    east_west_m: f64,
) -> Result<Quantity, ValidationError> {
    let area = north_south_m.max(MIN_FEE_SIDE_M) * east_west_m.max(MIN_FEE_SIDE_M);
    let units = (area * f64::from(config.inf_per_sqm)).round();
    if !units.is_finite() || units >= i64::MAX as f64 {
        return Err(ValidationError::FeeOverflow);
    }
    Quantity::from_units(units as i64, config.symbol()).ok_or(ValidationError::FeeOverflow)
}

#[cfg(test)]
mod tests {
    use super::registration_fee;
    use crate::config::RegistryConfig;

    #[test]
    fn fee_is_area_times_rate_in_minor_units() {
        let config = RegistryConfig::default();
        let fee = registration_fee(&config, 10.0, 20.0).expect("fee");
        assert_eq!(fee.amount, 10 * 20 * 10 * 10_000);
    }

    #[test]
    fn fee_clamps_each_side_to_one_meter() {
        let config = RegistryConfig::default();
        let unit = registration_fee(&config, 1.0, 1.0).expect("fee");
        let tiny = registration_fee(&config, 0.5, 0.5).expect("fee");
        let sliver = registration_fee(&config, 0.001, 100.0).expect("fee");

        assert_eq!(unit.amount, 100_000);
        assert_eq!(tiny, unit);
        assert_eq!(sliver.amount, 100 * 10 * 10_000);
    }

    #[test]
    fn fee_rounds_to_nearest_whole_unit() {
        let config = RegistryConfig::default();
        let fee = registration_fee(&config, 1.04, 1.0).expect("fee");
        assert_eq!(fee.amount, 10 * 10_000);
        let fee = registration_fee(&config, 1.06, 1.0).expect("fee");
        assert_eq!(fee.amount, 11 * 10_000);
    }
}
