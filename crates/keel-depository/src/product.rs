// crates/keel-depository/src/product.rs

use serde::{Deserialize, Serialize};

use keel_core::{Address, Amount, Timestamp};

/// A bond product: a supply of reward tokens sold against one collateral
/// token at a fixed price, purchasable until expiry.
///
/// A product is open while its record exists; deleting the record (owner
/// close or the first redemption that touches it) returns any unused supply
/// to the bond-issuance cap. A lookup of a deleted or never-created product
/// reads expiry 0, which is uniformly "expired".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Collateral token sold against.
    pub token: Address,
    /// Price of collateral in payout units, 10^18 scale.
    pub price: Amount,
    /// Remaining payout-token supply.
    pub supply: Amount,
    /// Purchase deadline; also the maturity of every bond sold from this
    /// product.
    pub expiry: Timestamp,
}

/// A single bond: a claim on `payout` reward tokens that matures at
/// `maturity`. Destroyed on redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    /// The account that purchased and may redeem the bond.
    pub account: Address,
    /// Payout owed in reward-token base units. Non-zero while outstanding.
    pub payout: Amount,
    /// Timestamp after which the bond is redeemable.
    pub maturity: Timestamp,
    /// The product this bond was sold from.
    pub product_id: u64,
}
