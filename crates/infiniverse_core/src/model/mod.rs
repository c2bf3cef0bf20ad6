//! Registry domain model.
//!
//! # Responsibility
//! - Define parcels, balances, catalog entries and placements.
//! - Own pure validation rules that need no storage access.
//!
//! # Invariants
//! - Identifiers are sequential integers allocated by storage.
//! - Validation helpers return `ValidationError`, never panic.

pub mod account;
pub mod balance;
pub mod catalog;
pub mod parcel;
pub mod placement;
pub mod quantity;
