// crates/keel-core/src/token.rs
//
// KEEL token amounts and supply constants.
//
// The KEEL reward token has 18 decimal places. All internal accounting uses
// the base unit (u128) to avoid floating-point precision issues in economic
// calculations. 1 KEEL = 10^18 base units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of base units in one KEEL. 1 KEEL = 10^18 base units.
pub const TOKEN_SCALE: u128 = 1_000_000_000_000_000_000;

/// Maximum supply of KEEL in base units. 1,000,000,000 KEEL * 10^18.
pub const MAX_SUPPLY: u128 = 1_000_000_000 * TOKEN_SCALE;

/// Upper bound on a single bond product's payout-token supply.
///
/// Any supplied or computed bond quantity above this bound is rejected with
/// the offending value and the bound, never silently truncated.
pub const MAX_BOND_SUPPLY: u128 = 1 << 96;

/// Type alias for a token amount in base units.
pub type Amount = u128;

/// A KEEL token amount.
///
/// Wraps an amount in base units. Used for display and configuration
/// ergonomics; ledger arithmetic operates on raw `Amount` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Keel {
    /// Amount in base units (1 KEEL = 10^18 base units).
    pub base: Amount,
}

impl Keel {
    /// Create a Keel amount from a whole-token value.
    pub fn from_whole(amount: u64) -> Self {
        Self {
            base: amount as u128 * TOKEN_SCALE,
        }
    }

    /// Create a Keel amount from a base-unit value.
    pub fn from_base(base: Amount) -> Self {
        Self { base }
    }

    /// Returns zero KEEL.
    pub fn zero() -> Self {
        Self { base: 0 }
    }
}

impl Add for Keel {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            base: self.base.saturating_add(rhs.base),
        }
    }
}

impl Sub for Keel {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            base: self.base.saturating_sub(rhs.base),
        }
    }
}

impl fmt::Display for Keel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.base / TOKEN_SCALE;
        let frac = self.base % TOKEN_SCALE;
        if frac == 0 {
            write!(f, "{} KEEL", whole)
        } else {
            // Display up to 18 decimal places, trimming trailing zeros
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} KEEL", whole, trimmed)
        }
    }
}
