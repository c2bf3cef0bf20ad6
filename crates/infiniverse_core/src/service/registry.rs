//! Registry facade: the externally dispatched entry points.
//!
//! # Responsibility
//! - Run every mutating operation as one `BEGIN IMMEDIATE` transaction.
//! - Hand outbound transfers to the [`TransferSink`] only after commit.
//! - Emit one `event=<operation>` log line per operation outcome.
//!
//! # Invariants
//! - A failed operation rolls back every write it made and sends nothing.
//! - Operations are serialized: each takes `&mut self`, and SQLite's write
//!   lock serializes other connections to the same file.

use crate::auth::Authority;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, RegistryConfig};
use crate::error::{RegistryError, RegistryResult};
use crate::ledger::{Transfer, TransferSink};
use crate::model::account::AccountName;
use crate::model::balance::Balance;
use crate::model::catalog::{CatalogEntry, CatalogId};
use crate::model::parcel::{Parcel, ParcelId};
use crate::model::placement::{Placement, PlacementId};
use crate::model::quantity::Quantity;
use crate::repo::catalog_repo::SqliteCatalogRepository;
use crate::repo::deposit_repo::SqliteDepositRepository;
use crate::repo::land_repo::SqliteLandRepository;
use crate::repo::placement_repo::SqlitePlacementRepository;
use crate::service::balance_service::{BalanceService, CreditOutcome};
use crate::service::catalog_service::CatalogService;
use crate::service::land_service::{LandRequest, LandService};
use crate::service::placement_service::{PlacementRequest, PlacementService, PlacementUpdate};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

/// Value produced inside a transaction plus transfers to send after commit.
struct Committed<T> {
    value: T,
    transfers: Vec<Transfer>,
}

impl<T> Committed<T> {
    fn local(value: T) -> Self {
        Self {
            value,
            transfers: Vec::new(),
        }
    }
}

/// Land registry bound to one SQLite connection.
pub struct Registry<S: TransferSink, C: Clock = SystemClock> {
    conn: Connection,
    config: RegistryConfig,
    sink: S,
    clock: C,
}

impl<S: TransferSink> Registry<S, SystemClock> {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection, config: RegistryConfig, sink: S) -> Result<Self, ConfigError> {
        Self::with_clock(conn, config, sink, SystemClock)
    }
}

impl<S: TransferSink, C: Clock> Registry<S, C> {
    pub fn with_clock(
        conn: Connection,
        config: RegistryConfig,
        sink: S,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            conn,
            config,
            sink,
            clock,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Claims a rectangle for `request.owner` and charges the fee.
    pub fn register_land(
        &mut self,
        auth: &impl Authority,
        request: &LandRequest,
    ) -> RegistryResult<Parcel> {
        let now = self.clock.now_epoch_secs();
        self.run("register_land", |conn, config| {
            let registration = land_service(conn, config).register_land(auth, request, now)?;
            Ok(Committed {
                value: registration.parcel,
                transfers: vec![registration.fee_transfer],
            })
        })
    }

    /// Places a poly asset on a parcel owned by the caller.
    pub fn persist_placement(
        &mut self,
        auth: &impl Authority,
        request: &PlacementRequest,
    ) -> RegistryResult<PlacementId> {
        self.run("persist_placement", |conn, config| {
            placement_service(conn, config)
                .persist_placement(auth, request)
                .map(Committed::local)
        })
    }

    pub fn update_placement(
        &mut self,
        auth: &impl Authority,
        placement_id: PlacementId,
        update: &PlacementUpdate,
    ) -> RegistryResult<()> {
        self.run("update_placement", |conn, config| {
            placement_service(conn, config)
                .update_placement(auth, placement_id, update)
                .map(Committed::local)
        })
    }

    /// Deletes a placement, evicting its catalog entry once unreferenced.
    pub fn delete_placement(
        &mut self,
        auth: &impl Authority,
        placement_id: PlacementId,
    ) -> RegistryResult<Option<CatalogId>> {
        self.run("delete_placement", |conn, config| {
            placement_service(conn, config)
                .delete_placement(auth, placement_id)
                .map(Committed::local)
        })
    }

    /// Opens a zero balance; no-op when one exists.
    pub fn open_balance(
        &mut self,
        auth: &impl Authority,
        owner: &AccountName,
    ) -> RegistryResult<()> {
        self.run("open_balance", |conn, config| {
            BalanceService::new(SqliteDepositRepository::new(conn), config)
                .open(auth, owner)
                .map(|_| Committed::local(()))
        })
    }

    /// Closes a balance, refunding any remainder to `owner`.
    pub fn close_balance(
        &mut self,
        auth: &impl Authority,
        owner: &AccountName,
    ) -> RegistryResult<()> {
        self.run("close_balance", |conn, config| {
            let refund = BalanceService::new(SqliteDepositRepository::new(conn), config)
                .close(auth, owner)?;
            Ok(Committed {
                value: (),
                transfers: refund.into_iter().collect(),
            })
        })
    }

    /// Inbound transfer notification from the trusted ledger.
    pub fn on_external_credit(
        &mut self,
        from: &AccountName,
        to: &AccountName,
        quantity: &Quantity,
        memo: &str,
    ) -> RegistryResult<CreditOutcome> {
        info!(
            "event=external_credit module=registry status=received from={} to={} amount={} memo_len={}",
            from,
            to,
            quantity,
            memo.len()
        );
        self.run("on_external_credit", |conn, config| {
            BalanceService::new(SqliteDepositRepository::new(conn), config)
                .credit(from, to, quantity)
                .map(Committed::local)
        })
    }

    pub fn get_parcel(&self, id: ParcelId) -> RegistryResult<Option<Parcel>> {
        land_service(&self.conn, &self.config).get_land(id)
    }

    pub fn list_parcels_by_owner(&self, owner: &AccountName) -> RegistryResult<Vec<Parcel>> {
        land_service(&self.conn, &self.config).list_lands_by_owner(owner)
    }

    pub fn get_balance(&self, owner: &AccountName) -> RegistryResult<Option<Balance>> {
        BalanceService::new(SqliteDepositRepository::new(&self.conn), &self.config)
            .get_balance(owner)
    }

    pub fn get_catalog_entry(&self, id: CatalogId) -> RegistryResult<Option<CatalogEntry>> {
        CatalogService::new(SqliteCatalogRepository::new(&self.conn), &self.config).get_entry(id)
    }

    pub fn list_catalog_entries(&self, owner: &AccountName) -> RegistryResult<Vec<CatalogEntry>> {
        CatalogService::new(SqliteCatalogRepository::new(&self.conn), &self.config)
            .list_entries_by_owner(owner)
    }

    pub fn get_placement(&self, id: PlacementId) -> RegistryResult<Option<Placement>> {
        placement_service(&self.conn, &self.config).get_placement(id)
    }

    pub fn list_placements_for_parcel(
        &self,
        parcel_id: ParcelId,
    ) -> RegistryResult<Vec<Placement>> {
        placement_service(&self.conn, &self.config).list_placements_for_parcel(parcel_id)
    }

    fn run<T>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&Connection, &RegistryConfig) -> RegistryResult<Committed<T>>,
    ) -> RegistryResult<T> {
        let started_at = Instant::now();
        match in_transaction(&mut self.conn, &self.config, body) {
            Ok(committed) => {
                info!(
                    "event={} module=registry status=ok duration_ms={} transfers={}",
                    operation,
                    started_at.elapsed().as_millis(),
                    committed.transfers.len()
                );
                for transfer in &committed.transfers {
                    self.sink.send_transfer(transfer);
                }
                Ok(committed.value)
            }
            Err(err) => {
                log_failure(operation, started_at, &err);
                Err(err)
            }
        }
    }
}

fn in_transaction<T>(
    conn: &mut Connection,
    config: &RegistryConfig,
    body: impl FnOnce(&Connection, &RegistryConfig) -> RegistryResult<Committed<T>>,
) -> RegistryResult<Committed<T>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let committed = body(&*tx, config)?;
    tx.commit()?;
    Ok(committed)
}

fn log_failure(operation: &'static str, started_at: Instant, err: &RegistryError) {
    let duration_ms = started_at.elapsed().as_millis();
    match err {
        RegistryError::Validation(reason) => warn!(
            "event={} module=registry status=rejected duration_ms={} error_code={} reason=\"{}\"",
            operation,
            duration_ms,
            err.code(),
            reason
        ),
        _ => error!(
            "event={} module=registry status=error duration_ms={} error_code={} error={}",
            operation,
            duration_ms,
            err.code(),
            err
        ),
    }
}

fn land_service<'a>(
    conn: &'a Connection,
    config: &'a RegistryConfig,
) -> LandService<'a, SqliteLandRepository<'a>, SqliteDepositRepository<'a>> {
    LandService::new(
        SqliteLandRepository::new(conn),
        BalanceService::new(SqliteDepositRepository::new(conn), config),
        config,
    )
}

fn placement_service<'a>(
    conn: &'a Connection,
    config: &'a RegistryConfig,
) -> PlacementService<
    'a,
    SqlitePlacementRepository<'a>,
    SqliteLandRepository<'a>,
    SqliteCatalogRepository<'a>,
> {
    PlacementService::new(
        SqlitePlacementRepository::new(conn),
        SqliteLandRepository::new(conn),
        CatalogService::new(SqliteCatalogRepository::new(conn), config),
    )
}
