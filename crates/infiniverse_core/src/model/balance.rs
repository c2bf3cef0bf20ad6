//! Prepaid balance model.

use crate::model::account::AccountName;
use crate::model::quantity::Quantity;
use serde::{Deserialize, Serialize};

/// Per-owner prepaid balance. `quantity.amount` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub owner: AccountName,
    pub quantity: Quantity,
}
