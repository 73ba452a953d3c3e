// crates/keel-depository/src/pricer.rs
//
// Fixed-rate reference implementation of the bond pricing capability.
// Production deployments plug in an LP-price oracle instead.

use std::collections::HashMap;

use keel_core::traits::BondPricer;
use keel_core::{Address, Amount, KeelError, TOKEN_SCALE};

/// Prices collateral tokens at fixed, pre-configured rates.
#[derive(Debug, Default)]
pub struct FixedRatePricer {
    prices: HashMap<Address, Amount>,
}

impl FixedRatePricer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price (payout units per collateral unit, 10^18 scale) for a
    /// collateral token.
    pub fn set_price(&mut self, token: &Address, price: Amount) {
        self.prices.insert(*token, price);
    }
}

impl BondPricer for FixedRatePricer {
    fn current_price(&self, token: &Address) -> Amount {
        self.prices.get(token).copied().unwrap_or(0)
    }

    fn payout_for(&self, token_amount: Amount, price: Amount) -> Result<Amount, KeelError> {
        let scaled = token_amount.checked_mul(price).ok_or(KeelError::Overflow {
            value: token_amount,
            bound: Amount::MAX / price.max(1),
        })?;
        let payout = scaled / TOKEN_SCALE;
        if payout == 0 {
            return Err(KeelError::ZeroValue { what: "payout" });
        }
        Ok(payout)
    }
}
