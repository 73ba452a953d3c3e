// crates/keel-dispenser/src/lib.rs
//
// keel-dispenser: the incentive dispenser of the Keel protocol.
//
// Routes two independent claim paths: owner incentives (native reward +
// reward-token top-up, paid through the treasury) and service staking
// incentives (dispatched to staking targets on the home chain directly, or
// across bridges to L2 chains through registered deposit processors, with
// per-chain withheld-amount reconciliation).

pub mod dispenser;
pub mod lock;
pub mod staking;

#[cfg(test)]
pub(crate) mod testutil;

pub use dispenser::{Dispenser, PauseState};
pub use staking::StakingIncentives;
