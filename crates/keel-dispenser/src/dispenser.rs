// crates/keel-dispenser/src/dispenser.rs
//
// Dispenser state, pause register, processor registry, withheld ledger, and
// the owner-incentive claim path. The staking claim paths live in
// staking.rs.

use std::collections::HashMap;

use keel_core::traits::{
    DepositProcessor, EpochLedger, NativeBank, RewardToken, WithheldSink, MAX_CHAIN_ID,
};
use keel_core::epoch::UnitType;
use keel_core::{Address, Amount, KeelError};
use keel_treasury::Treasury;

use crate::lock::ReentrancyLock;

/// Global pause register gating the two claim paths independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    Unpaused,
    DevIncentivesPaused,
    StakingIncentivesPaused,
    AllPaused,
}

/// The incentive dispenser. Exclusively owns the withheld ledger, the
/// remaining-staking ledger, the last-claimed-epoch ledger, and the
/// chain-to-processor table.
pub struct Dispenser {
    pub(crate) address: Address,
    owner: Address,
    pause: PauseState,
    pub(crate) lock: ReentrancyLock,

    pub(crate) processors: HashMap<u64, Box<dyn DepositProcessor>>,
    pub(crate) withheld: HashMap<u64, Amount>,
    pub(crate) remaining_staking: HashMap<u64, Amount>,
    pub(crate) last_claimed_epoch: HashMap<(u64, Address), u64>,
}

impl Dispenser {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            pause: PauseState::Unpaused,
            lock: ReentrancyLock::new(),
            processors: HashMap::new(),
            withheld: HashMap::new(),
            remaining_staking: HashMap::new(),
            last_claimed_epoch: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause
    }

    fn require_owner(&self, caller: &Address, action: &'static str) -> Result<(), KeelError> {
        if *caller != self.owner {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Set the pause register. Owner-only.
    pub fn set_pause_state(
        &mut self,
        caller: &Address,
        state: PauseState,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "set pause state")?;
        self.pause = state;
        tracing::info!(?state, "pause state changed");
        Ok(())
    }

    pub(crate) fn check_dev_incentives_unpaused(&self) -> Result<(), KeelError> {
        if matches!(
            self.pause,
            PauseState::DevIncentivesPaused | PauseState::AllPaused
        ) {
            return Err(KeelError::Paused {
                path: "owner incentive",
            });
        }
        Ok(())
    }

    pub(crate) fn check_staking_incentives_unpaused(&self) -> Result<(), KeelError> {
        if matches!(
            self.pause,
            PauseState::StakingIncentivesPaused | PauseState::AllPaused
        ) {
            return Err(KeelError::Paused {
                path: "staking incentive",
            });
        }
        Ok(())
    }

    /// Overwrite the chain-to-processor mapping, 1:1. Owner-only. A `None`
    /// processor disables the chain.
    pub fn set_deposit_processors(
        &mut self,
        caller: &Address,
        processors: Vec<Option<Box<dyn DepositProcessor>>>,
        chain_ids: Vec<u64>,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "set deposit processors")?;
        if processors.len() != chain_ids.len() {
            return Err(KeelError::LengthMismatch {
                left: processors.len(),
                right: chain_ids.len(),
            });
        }
        for &chain_id in &chain_ids {
            if chain_id == 0 || chain_id > MAX_CHAIN_ID {
                return Err(KeelError::ChainIdOutOfRange {
                    chain_id,
                    max: MAX_CHAIN_ID,
                });
            }
        }
        for (processor, chain_id) in processors.into_iter().zip(chain_ids) {
            match processor {
                Some(processor) => {
                    tracing::info!(chain_id, processor = %processor.address(), "deposit processor set");
                    self.processors.insert(chain_id, processor);
                }
                None => {
                    tracing::info!(chain_id, "deposit processor disabled");
                    self.processors.remove(&chain_id);
                }
            }
        }
        Ok(())
    }

    /// Withheld-ledger balance for a chain.
    pub fn withheld_amount(&self, chain_id: u64) -> Amount {
        self.withheld.get(&chain_id).copied().unwrap_or(0)
    }

    /// Last epoch in which (chain, target) claimed staking incentives.
    pub fn last_claimed(&self, chain_id: u64, target: &Address) -> Option<u64> {
        self.last_claimed_epoch.get(&(chain_id, *target)).copied()
    }

    /// Owner-only manual override of a chain's withheld ledger entry, for
    /// recovery after bridge irregularities.
    pub fn sync_withheld_amount_maintenance(
        &mut self,
        caller: &Address,
        chain_id: u64,
        amount: Amount,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "override withheld amount")?;
        if chain_id == 0 || chain_id > MAX_CHAIN_ID {
            return Err(KeelError::ChainIdOutOfRange {
                chain_id,
                max: MAX_CHAIN_ID,
            });
        }
        self.withheld.insert(chain_id, amount);
        tracing::info!(chain_id, amount, "withheld ledger overridden");
        Ok(())
    }

    /// Claim the accrued owner incentives for the caller's units. Pays the
    /// native reward and mints the top-up through the treasury; a claim that
    /// totals zero is a hard failure.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_owner_incentives(
        &mut self,
        caller: &Address,
        unit_types: &[UnitType],
        unit_ids: &[u64],
        tokenomics: &mut dyn EpochLedger,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        native: &mut dyn NativeBank,
    ) -> Result<(Amount, Amount), KeelError> {
        self.check_dev_incentives_unpaused()?;
        self.lock.enter()?;
        let result = self.claim_owner_incentives_inner(
            caller,
            unit_types,
            unit_ids,
            tokenomics,
            treasury,
            reward_token,
            native,
        );
        self.lock.exit();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn claim_owner_incentives_inner(
        &mut self,
        caller: &Address,
        unit_types: &[UnitType],
        unit_ids: &[u64],
        tokenomics: &mut dyn EpochLedger,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        native: &mut dyn NativeBank,
    ) -> Result<(Amount, Amount), KeelError> {
        let (reward, top_up) =
            tokenomics.account_owner_incentives(caller, unit_types, unit_ids)?;
        if reward == 0 && top_up == 0 {
            return Err(KeelError::ZeroValue {
                what: "claimable incentives",
            });
        }

        if let Err(e) = treasury.pay_owner_incentives(
            &self.address,
            caller,
            reward,
            top_up,
            reward_token,
            native,
        ) {
            // Re-credit the drained accrual so the failed claim is retryable.
            tokenomics.restore_owner_incentives(caller, reward, top_up);
            return Err(e);
        }

        tracing::info!(%caller, reward, top_up, "owner incentives claimed");
        Ok((reward, top_up))
    }
}

impl WithheldSink for Dispenser {
    /// Accumulate a withheld amount reported back by a chain's registered
    /// deposit processor.
    fn sync_withheld_amount(
        &mut self,
        caller: &Address,
        chain_id: u64,
        amount: Amount,
    ) -> Result<(), KeelError> {
        let processor = self
            .processors
            .get(&chain_id)
            .ok_or(KeelError::ProcessorNotRegistered { chain_id })?;
        if processor.address() != *caller {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "sync withheld amount",
            });
        }
        if amount == 0 {
            return Err(KeelError::ZeroValue { what: "amount" });
        }

        let entry = self.withheld.entry(chain_id).or_default();
        *entry = entry.checked_add(amount).ok_or(KeelError::Overflow {
            value: amount,
            bound: Amount::MAX,
        })?;
        tracing::info!(chain_id, amount, total = *entry, "withheld amount synced");
        Ok(())
    }
}
