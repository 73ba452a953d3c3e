// crates/keel-tokenomics/src/lib.rs
//
// keel-tokenomics: the epoch accountant of the Keel incentive protocol.
//
// Advances a discrete epoch clock, closes one EpochPoint and one
// StakingPoint per epoch, and manages the three budget pools the other
// components draw on: the bond-issuance cap, the mint allowance, and the
// per-epoch staking budget.

pub mod tokenomics;

pub use tokenomics::{ServiceUnit, Tokenomics};
