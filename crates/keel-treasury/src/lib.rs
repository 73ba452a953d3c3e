// crates/keel-treasury/src/lib.rs
//
// keel-treasury: the treasury vault of the Keel incentive protocol.
//
// Custodies the native-asset buckets and the collateral-token reserves,
// executes reward-token mints under the accountant's inflation policy, and
// turns epochs over into claimable reward pools.

pub mod treasury;

pub use treasury::Treasury;
