// crates/keel-depository/src/lib.rs
//
// keel-depository: the bond ledger of the Keel incentive protocol.
//
// Bond products sell reward-token supply against priced collateral with an
// expiry; individual bonds mature at the product's expiry and are redeemed
// for their payout. Unused supply flows back to the accountant's
// bond-issuance cap when a product closes.

pub mod depository;
pub mod pricer;
pub mod product;

pub use depository::Depository;
pub use pricer::FixedRatePricer;
pub use product::{Bond, Product};
