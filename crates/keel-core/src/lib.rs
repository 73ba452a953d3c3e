// crates/keel-core/src/lib.rs
//
// keel-core: Core types, errors, and capability traits for the Keel
// incentive protocol.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the monetary scalar types, the component address type, the
// protocol-wide error enum, the epoch snapshot data model, the trait
// interfaces for every external collaborator, and the runtime configuration.

pub mod address;
pub mod bank;
pub mod config;
pub mod epoch;
pub mod error;
pub mod token;
pub mod traits;

/// Unix timestamp in seconds. Every time-dependent operation takes the
/// current time as an explicit argument; there is no ambient clock.
pub type Timestamp = u64;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use keel_core::Address;`

pub use address::Address;
pub use bank::{CollateralLedger, NativeLedger, TokenLedger};
pub use config::ProtocolConfig;
pub use epoch::{EpochPoint, RewardSplit, StakingPoint, UnitType};
pub use error::KeelError;
pub use token::{Amount, Keel, MAX_BOND_SUPPLY, MAX_SUPPLY, TOKEN_SCALE};
pub use traits::{
    BondPricer, BridgeRelay, CollateralBank, DepositProcessor, EpochLedger, LocalStaking,
    NativeBank, RewardToken, SharedProcessor, VoteRegistry, WithheldSink, HOME_CHAIN_ID,
    MAX_CHAIN_ID,
};
