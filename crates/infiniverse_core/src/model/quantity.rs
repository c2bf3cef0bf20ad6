//! Fixed-point currency amounts.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Currency tag: ticker code plus implied decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub code: String,
    pub precision: u8,
}

impl Symbol {
    pub fn new(code: impl Into<String>, precision: u8) -> Self {
        Self {
            code: code.into(),
            precision,
        }
    }

    /// Minor units per whole unit, e.g. `10_000` for precision 4.
    ///
    /// `None` when the precision exceeds what `i64` can scale (above 18).
    pub fn unit_scale(&self) -> Option<i64> {
        10_i64.checked_pow(u32::from(self.precision))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// Amount in minor units tagged with its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: i64,
    pub symbol: Symbol,
}

impl Quantity {
    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    /// Builds a quantity from whole units, `None` on overflow.
    pub fn from_units(units: i64, symbol: Symbol) -> Option<Self> {
        let amount = units.checked_mul(symbol.unit_scale()?)?;
        Some(Self::new(amount, symbol))
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Unscalable precision: print raw minor units with the symbol tag.
        let Some(scale) = self.symbol.unit_scale() else {
            return write!(f, "{} {}", self.amount, self.symbol);
        };
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        let whole = magnitude / scale.unsigned_abs();
        let fraction = magnitude % scale.unsigned_abs();
        if self.symbol.precision == 0 {
            write!(f, "{sign}{whole} {}", self.symbol.code)
        } else {
            write!(
                f,
                "{sign}{whole}.{fraction:0width$} {}",
                self.symbol.code,
                width = usize::from(self.symbol.precision)
            )
        }
    }
}
