// crates/keel-core/src/traits.rs
//
// Capability interfaces for the external collaborators of the incentive
// core. Each is injected where needed; production and test implementations
// are separate.

use crate::address::Address;
use crate::epoch::{EpochPoint, RewardSplit, StakingPoint, UnitType};
use crate::error::KeelError;
use crate::token::Amount;
use crate::Timestamp;

/// The chain id of the home chain, where staking deposits are made directly
/// instead of through a bridge.
pub const HOME_CHAIN_ID: u64 = 1;

/// Upper bound on supported chain ids.
pub const MAX_CHAIN_ID: u64 = u64::MAX / 2;

/// Collateral pricing for bond purchases.
///
/// Implemented outside this core (LP price oracle); tests use fixed-rate
/// implementations.
pub trait BondPricer: Send + Sync {
    /// Current price of the collateral token in payout units, 10^18 scale.
    fn current_price(&self, token: &Address) -> Amount;

    /// Payout owed for `token_amount` of collateral at `price`.
    ///
    /// Never returns zero for a non-zero price and a non-zero amount in a
    /// valid configuration. Multiplication overflow is surfaced, never
    /// truncated.
    fn payout_for(&self, token_amount: Amount, price: Amount) -> Result<Amount, KeelError>;
}

/// The epoch accountant capability consumed by the depository, treasury,
/// and dispenser.
///
/// Implemented by keel-tokenomics.
pub trait EpochLedger: Send + Sync {
    /// The current (still running) epoch counter. Epochs start at 1.
    fn current_epoch(&self) -> u64;

    /// Timestamp at which the running epoch can be closed.
    fn epoch_due(&self) -> Timestamp;

    /// Snapshot of a closed epoch, if it exists.
    fn epoch_point(&self, epoch: u64) -> Option<EpochPoint>;

    /// Staking snapshot of a closed epoch, if it exists.
    fn staking_point(&self, epoch: u64) -> Option<StakingPoint>;

    /// Reserve `amount` of payout supply against the bond-issuance cap.
    /// Returns false (and reserves nothing) if the cap lacks headroom.
    fn reserve_for_bond_program(&mut self, amount: Amount) -> bool;

    /// Current headroom of the bond-issuance cap.
    fn bond_program_headroom(&self) -> Amount;

    /// Return unused supply from a closed bond product to the cap.
    fn refund_from_bond_program(&mut self, amount: Amount);

    /// Ask the inflation policy to cover a mint of `amount`. Returns false
    /// (and debits nothing) if the remaining allowance is insufficient.
    fn request_mint_allowance(&mut self, amount: Amount) -> bool;

    /// Return a previously granted mint allowance that was not used because
    /// a later step of the same operation failed.
    fn refund_mint_allowance(&mut self, amount: Amount);

    /// Classify an aggregate service deposit into (revenue, donation)
    /// shares and record the donation accrual for the running epoch.
    fn track_service_revenue(
        &mut self,
        service_ids: &[u64],
        amounts: &[Amount],
    ) -> Result<(Amount, Amount), KeelError>;

    /// Return declined or capped staking incentives to the general pool.
    fn refund_from_service_staking(&mut self, amount: Amount);

    /// Close the running epoch if its length has elapsed. Returns the
    /// reward split for the closed epoch, or None while it is still running.
    fn checkpoint(&mut self, now: Timestamp) -> Option<RewardSplit>;

    /// Compute and drain the owner incentives accrued to the listed units.
    /// Ownership of the units is verified here, not by the caller.
    fn account_owner_incentives(
        &mut self,
        account: &Address,
        unit_types: &[UnitType],
        unit_ids: &[u64],
    ) -> Result<(Amount, Amount), KeelError>;

    /// Re-credit incentives drained by `account_owner_incentives` after a
    /// later step of the same claim failed, so the claim stays retryable.
    fn restore_owner_incentives(&mut self, account: &Address, reward: Amount, top_up: Amount);
}

/// Vote-weight registry for staking targets.
pub trait VoteRegistry: Send + Sync {
    /// Finalize a nominee's accounting before its weight is read.
    fn checkpoint_nominee(&mut self, target: &Address, chain_id: u64);

    /// Relative weight of (target, chain) at time `at`, in [0, 10^18].
    fn relative_weight(&self, target: &Address, chain_id: u64, at: Timestamp) -> u128;
}

/// Mint/transfer primitives of the KEEL reward token.
pub trait RewardToken: Send + Sync {
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), KeelError>;

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount)
        -> Result<(), KeelError>;

    /// Spender-mediated transfer; requires a prior `approve`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError>;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount)
        -> Result<(), KeelError>;

    fn balance_of(&self, account: &Address) -> Amount;
}

/// Transfer primitives of external collateral tokens, keyed by token address.
pub trait CollateralBank: Send + Sync {
    fn transfer_from(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError>;

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError>;
}

/// Native-asset value transfers.
pub trait NativeBank: Send + Sync {
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount)
        -> Result<(), KeelError>;
}

/// Home-chain staking contracts that accept direct deposits.
pub trait LocalStaking: Send + Sync {
    fn deposit(&mut self, target: &Address, amount: Amount) -> Result<(), KeelError>;
}

/// One registered deposit processor per L2 chain; routes staking transfers
/// across that chain's bridge.
///
/// Implemented by keel-bridge.
pub trait DepositProcessor: Send + Sync {
    /// The processor's own address, used to authenticate its withheld-sync
    /// callbacks and to receive token approvals.
    fn address(&self) -> Address;

    /// Send a single (target, amount) pair plus `transfer_amount` of tokens
    /// across the bridge. Returns the assigned message sequence number.
    fn send_message(
        &mut self,
        caller: &Address,
        target: &Address,
        staking_amount: Amount,
        bridge_payload: &[u8],
        transfer_amount: Amount,
        reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError>;

    /// Batch variant of `send_message`.
    fn send_message_batch(
        &mut self,
        caller: &Address,
        targets: &[Address],
        staking_amounts: &[Amount],
        bridge_payload: &[u8],
        transfer_amount: Amount,
        reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError>;
}

/// Shared handle to a deposit processor.
///
/// The dispenser owns its processor registry, but a bridge adapter also
/// serves the inbound delivery path outside the dispenser. Registering a
/// `SharedProcessor` keeps the adapter reachable from both sides.
pub struct SharedProcessor(pub std::sync::Arc<std::sync::Mutex<dyn DepositProcessor + Send>>);

impl DepositProcessor for SharedProcessor {
    fn address(&self) -> Address {
        self.0.lock().expect("processor lock poisoned").address()
    }

    fn send_message(
        &mut self,
        caller: &Address,
        target: &Address,
        staking_amount: Amount,
        bridge_payload: &[u8],
        transfer_amount: Amount,
        reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError> {
        self.0.lock().expect("processor lock poisoned").send_message(
            caller,
            target,
            staking_amount,
            bridge_payload,
            transfer_amount,
            reward_token,
        )
    }

    fn send_message_batch(
        &mut self,
        caller: &Address,
        targets: &[Address],
        staking_amounts: &[Amount],
        bridge_payload: &[u8],
        transfer_amount: Amount,
        reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError> {
        self.0
            .lock()
            .expect("processor lock poisoned")
            .send_message_batch(
                caller,
                targets,
                staking_amounts,
                bridge_payload,
                transfer_amount,
                reward_token,
            )
    }
}

/// Opaque message-passing transport underneath a deposit processor.
pub trait BridgeRelay: Send + Sync {
    /// Relay `amount` of `token` plus `payload` to `receiver` on the remote
    /// chain. Asynchronous; no delivery guarantee.
    fn relay(
        &mut self,
        token: &Address,
        receiver: &Address,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), KeelError>;

    /// Sender identity of the message currently being delivered inbound.
    fn last_message_sender(&self) -> Address;
}

/// Receiver of withheld-amount reports decoded from inbound bridge messages.
///
/// Implemented by keel-dispenser.
pub trait WithheldSink: Send + Sync {
    fn sync_withheld_amount(
        &mut self,
        caller: &Address,
        chain_id: u64,
        amount: Amount,
    ) -> Result<(), KeelError>;
}
