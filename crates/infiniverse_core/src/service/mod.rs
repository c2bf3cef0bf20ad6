//! Registry use-case services.
//!
//! # Responsibility
//! - Enforce registry rules above the repository layer.
//! - Expose the external entry points through [`registry::Registry`].
//!
//! # Invariants
//! - Component services run inside a transaction owned by `Registry`; they
//!   never commit and never talk to the ledger directly.
//! - Outbound transfers are returned to the caller, not sent.

pub mod balance_service;
pub mod catalog_service;
pub mod land_service;
pub mod placement_service;
pub mod registry;
