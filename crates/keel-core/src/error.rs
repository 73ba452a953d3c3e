// crates/keel-core/src/error.rs

use thiserror::Error;

use crate::address::Address;
use crate::token::Amount;
use crate::Timestamp;

/// Protocol-wide error types for the Keel incentive core.
///
/// Every failure aborts the whole call; variants carry the offending values
/// so a caller can decide whether to retry, adjust inputs, or escalate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeelError {
    /// Caller is not the designated owner/manager/adapter for the action.
    #[error("unauthorized: caller {caller} cannot perform {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    /// A zero amount was supplied where a non-zero value is required.
    #[error("zero value supplied for {what}")]
    ZeroValue { what: &'static str },

    /// A zero address was supplied where a non-zero address is required.
    #[error("zero address supplied for {what}")]
    ZeroAddress { what: &'static str },

    /// Parallel input arrays differ in length.
    #[error("array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The native value sent with a deposit does not equal the sum of the
    /// per-service amounts.
    #[error("value mismatch: sent {sent}, sum of amounts {sum}")]
    ValueMismatch { sent: Amount, sum: Amount },

    /// A supplied or computed quantity exceeds the width reserved for it.
    #[error("overflow: value {value} exceeds bound {bound}")]
    Overflow { value: u128, bound: u128 },

    /// Chain id outside the supported range.
    #[error("chain id {chain_id} out of range (1..={max})")]
    ChainIdOutOfRange { chain_id: u64, max: u64 },

    /// A batch path requires strictly ascending, non-repeating entries.
    #[error("batch entries out of order or repeated at index {index}")]
    OutOfOrder { index: usize },

    /// Product expired or never created (an absent product reads expiry 0).
    #[error("product {product_id} expired or does not exist")]
    ProductExpired { product_id: u64 },

    /// Product already closed or never created.
    #[error("product {product_id} already closed")]
    ProductClosed { product_id: u64 },

    /// Bond unknown, not yet matured, or already redeemed.
    #[error("bond {bond_id} is not redeemable")]
    BondNotRedeemable { bond_id: u64 },

    /// Requested payout exceeds the product's remaining supply.
    #[error("insufficient product supply: requested {requested}, remaining {remaining}")]
    InsufficientSupply { requested: Amount, remaining: Amount },

    /// Vesting period below the protocol minimum.
    #[error("vesting {vesting}s below minimum {minimum}s")]
    VestingTooShort { vesting: u64, minimum: u64 },

    /// The epoch accountant declined to reserve supply for a bond program.
    #[error("bond program reservation declined: requested {requested}, headroom {headroom}")]
    ReservationDeclined { requested: Amount, headroom: Amount },

    /// The inflation policy declined a mint.
    #[error("mint of {amount} rejected by inflation policy")]
    MintRejected { amount: Amount },

    /// Collateral token is not enabled in the treasury registry.
    #[error("token {token} is not enabled")]
    TokenNotEnabled { token: Address },

    /// Enable/disable requested for a token already in that state.
    #[error("token {token} already in requested state")]
    TokenStateUnchanged { token: Address },

    /// A token cannot be disabled while its reserve is non-zero.
    #[error("token {token} still holds {reserve} in reserve")]
    NonZeroReserve { token: Address, reserve: Amount },

    /// A custodied balance does not cover the requested amount.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// Staking incentives for this (chain, target) were already claimed in
    /// the current epoch.
    #[error("epoch {epoch} already claimed for target {target} on chain {chain_id}")]
    EpochAlreadyClaimed {
        chain_id: u64,
        target: Address,
        epoch: u64,
    },

    /// The current epoch has not ended yet, so there is nothing to allocate.
    #[error("epoch still running: now {now}, ends at {due}")]
    EpochStillRunning { now: Timestamp, due: Timestamp },

    /// The attempted claim path is paused.
    #[error("{path} claims are paused")]
    Paused { path: &'static str },

    /// A claim entry point was re-entered while a claim was in flight.
    #[error("re-entrant call rejected")]
    Reentrancy,

    /// No deposit processor is registered for the requested chain.
    #[error("no deposit processor registered for chain {chain_id}")]
    ProcessorNotRegistered { chain_id: u64 },

    /// An underlying value or token transfer reported failure. Always fatal;
    /// the caller must retry the whole operation.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Upstream accounting produced an impossible state. Not user-correctable.
    #[error("accounting invariant violated: {0}")]
    InvariantViolation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for KeelError {
    fn from(e: serde_json::Error) -> Self {
        KeelError::Serialization(e.to_string())
    }
}
