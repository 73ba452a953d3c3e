// crates/keel-bridge/src/lib.rs
//
// keel-bridge: per-chain bridge adapters for the Keel incentive protocol.
//
// One adapter serves one L2 chain: outbound, it escrows the transfer amount
// and relays (target, amount) batches through the chain's message-passing
// bridge; inbound, it authenticates the remote counterpart's withheld-amount
// reports and forwards them into the dispenser's ledger.

pub mod adapter;
pub mod message;

pub use adapter::BridgeAdapter;
pub use message::{StakingMessage, WithheldReport};
