// crates/keel-dispenser/src/staking.rs
//
// The staking-incentive claim paths.
//
// A claim iterates every epoch since the (chain, target) pair's last claim,
// splits each epoch's pro-rata amount into stake (delivered) and return
// (redirected back to the general staking pool), debits the per-epoch
// remaining-staking ledger, nets the delivery against the chain's withheld
// credit, and dispatches only the shortfall as a fresh mint. All internal
// ledger effects of a claim commit atomically: any failure restores them.

use std::collections::HashMap;

use keel_core::traits::{
    EpochLedger, LocalStaking, RewardToken, VoteRegistry, HOME_CHAIN_ID, MAX_CHAIN_ID,
};
use keel_core::{Address, Amount, KeelError, TOKEN_SCALE};
use keel_treasury::Treasury;

use crate::dispenser::Dispenser;

/// Stake and return totals of one staking-incentive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StakingIncentives {
    /// Amount delivered to staking targets.
    pub stake: Amount,
    /// Amount redirected back to the general staking pool.
    pub return_amount: Amount,
}

/// `amount * weight / 10^18` without overflowing u128.
fn apply_weight(amount: Amount, weight: u128) -> Amount {
    amount / TOKEN_SCALE * weight + amount % TOKEN_SCALE * weight / TOKEN_SCALE
}

struct LedgerSnapshot {
    withheld: HashMap<u64, Amount>,
    remaining_staking: HashMap<u64, Amount>,
    last_claimed_epoch: HashMap<(u64, Address), u64>,
}

impl Dispenser {
    fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            withheld: self.withheld.clone(),
            remaining_staking: self.remaining_staking.clone(),
            last_claimed_epoch: self.last_claimed_epoch.clone(),
        }
    }

    fn restore(&mut self, snapshot: LedgerSnapshot) {
        self.withheld = snapshot.withheld;
        self.remaining_staking = snapshot.remaining_staking;
        self.last_claimed_epoch = snapshot.last_claimed_epoch;
    }

    fn check_chain_id(&self, chain_id: u64) -> Result<(), KeelError> {
        if chain_id == 0 || chain_id > MAX_CHAIN_ID {
            return Err(KeelError::ChainIdOutOfRange {
                chain_id,
                max: MAX_CHAIN_ID,
            });
        }
        Ok(())
    }

    /// Every non-home chain of a claim must have a registered processor
    /// before any ledger effect happens.
    fn check_processor_registered(&self, chain_id: u64) -> Result<(), KeelError> {
        if chain_id != HOME_CHAIN_ID && !self.processors.contains_key(&chain_id) {
            return Err(KeelError::ProcessorNotRegistered { chain_id });
        }
        Ok(())
    }

    /// Accumulate the stake/return amounts owed to (chain, target) across
    /// every epoch since its last claim, debit the touched epochs'
    /// remaining-staking ledger, and advance the last-claimed marker to the
    /// current epoch (zero-activity epochs included).
    ///
    /// At most one claim per epoch per pair: a pair whose marker already
    /// equals the current epoch counter is rejected.
    pub fn compute_staking_incentives(
        &mut self,
        chain_id: u64,
        target: &Address,
        tokenomics: &dyn EpochLedger,
        votes: &mut dyn VoteRegistry,
    ) -> Result<StakingIncentives, KeelError> {
        self.check_chain_id(chain_id)?;
        if target.is_zero() {
            return Err(KeelError::ZeroAddress {
                what: "staking target",
            });
        }
        votes.checkpoint_nominee(target, chain_id);

        let key = (chain_id, *target);
        let current = tokenomics.current_epoch();
        let first = self.last_claimed_epoch.get(&key).copied().unwrap_or(1);
        if first == current {
            return Err(KeelError::EpochAlreadyClaimed {
                chain_id,
                target: *target,
                epoch: current,
            });
        }

        let mut totals = StakingIncentives::default();
        for epoch in first..current {
            let sp = tokenomics.staking_point(epoch).ok_or_else(|| {
                KeelError::InvariantViolation(format!(
                    "missing staking snapshot for closed epoch {}",
                    epoch
                ))
            })?;
            let ep = tokenomics.epoch_point(epoch).ok_or_else(|| {
                KeelError::InvariantViolation(format!(
                    "missing epoch snapshot for closed epoch {}",
                    epoch
                ))
            })?;

            let weight = votes.relative_weight(target, chain_id, ep.end_time);
            let amount = apply_weight(sp.staking_amount, weight);
            if amount == 0 {
                continue;
            }

            let (stake, returned) = if weight < sp.min_staking_weight {
                (0, amount)
            } else {
                let stake = amount.min(sp.max_staking_amount);
                (stake, amount - stake)
            };

            let remaining = self
                .remaining_staking
                .entry(epoch)
                .or_insert(sp.staking_amount);
            if amount > *remaining {
                return Err(KeelError::InvariantViolation(format!(
                    "epoch {} staking debit {} exceeds remaining {}",
                    epoch, amount, remaining
                )));
            }
            *remaining -= amount;

            totals.stake += stake;
            totals.return_amount += returned;
        }

        self.last_claimed_epoch.insert(key, current);
        Ok(totals)
    }

    /// Net a chain's total stake against its withheld credit, mint the
    /// shortfall to the dispenser, and dispatch: home-chain targets get a
    /// direct deposit, other chains a bridge message carrying the actual
    /// transferred amount.
    #[allow(clippy::too_many_arguments)]
    fn settle_chain(
        &mut self,
        chain_id: u64,
        pairs: &[(Address, Amount)],
        total_stake: Amount,
        bridge_payload: &[u8],
        tokenomics: &mut dyn EpochLedger,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        staking: &mut dyn LocalStaking,
    ) -> Result<(), KeelError> {
        if total_stake == 0 {
            return Ok(());
        }

        let withheld = self.withheld.get(&chain_id).copied().unwrap_or(0);
        let credit = withheld.min(total_stake);
        let transfer = total_stake - credit;
        if credit > 0 {
            self.withheld.insert(chain_id, withheld - credit);
        }
        if transfer > 0 {
            treasury.pay_staking_transfer(&self.address, transfer, tokenomics, reward_token)?;
        }

        if chain_id == HOME_CHAIN_ID {
            for (target, stake) in pairs.iter().filter(|(_, stake)| *stake > 0) {
                reward_token.approve(&self.address, target, *stake)?;
                staking.deposit(target, *stake)?;
            }
        } else {
            let live: Vec<(Address, Amount)> = pairs
                .iter()
                .copied()
                .filter(|(_, stake)| *stake > 0)
                .collect();
            let self_addr = self.address;
            let processor = self
                .processors
                .get_mut(&chain_id)
                .ok_or(KeelError::ProcessorNotRegistered { chain_id })?;
            let processor_addr = processor.address();
            reward_token.approve(&self_addr, &processor_addr, transfer)?;
            let sequence = if live.len() == 1 {
                processor.send_message(
                    &self_addr,
                    &live[0].0,
                    live[0].1,
                    bridge_payload,
                    transfer,
                    reward_token,
                )?
            } else {
                let (targets, amounts): (Vec<Address>, Vec<Amount>) =
                    live.into_iter().unzip();
                processor.send_message_batch(
                    &self_addr,
                    &targets,
                    &amounts,
                    bridge_payload,
                    transfer,
                    reward_token,
                )?
            };
            tracing::info!(chain_id, sequence, total_stake, transfer, "staking dispatch posted");
        }
        Ok(())
    }

    /// Claim the staking incentives of one (chain, target) pair and dispatch
    /// them. Returns the stake/return totals.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_staking_incentives(
        &mut self,
        chain_id: u64,
        target: &Address,
        bridge_payload: &[u8],
        tokenomics: &mut dyn EpochLedger,
        votes: &mut dyn VoteRegistry,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        staking: &mut dyn LocalStaking,
    ) -> Result<StakingIncentives, KeelError> {
        self.check_staking_incentives_unpaused()?;
        self.check_chain_id(chain_id)?;
        self.check_processor_registered(chain_id)?;
        self.lock.enter()?;
        let snapshot = self.snapshot();
        let result = self.claim_staking_inner(
            chain_id,
            target,
            bridge_payload,
            tokenomics,
            votes,
            treasury,
            reward_token,
            staking,
        );
        if result.is_err() {
            self.restore(snapshot);
        }
        self.lock.exit();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn claim_staking_inner(
        &mut self,
        chain_id: u64,
        target: &Address,
        bridge_payload: &[u8],
        tokenomics: &mut dyn EpochLedger,
        votes: &mut dyn VoteRegistry,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        staking: &mut dyn LocalStaking,
    ) -> Result<StakingIncentives, KeelError> {
        let totals = self.compute_staking_incentives(chain_id, target, tokenomics, votes)?;
        self.settle_chain(
            chain_id,
            &[(*target, totals.stake)],
            totals.stake,
            bridge_payload,
            tokenomics,
            treasury,
            reward_token,
            staking,
        )?;
        if totals.return_amount > 0 {
            tokenomics.refund_from_service_staking(totals.return_amount);
        }

        tracing::info!(
            chain_id,
            %target,
            stake = totals.stake,
            returned = totals.return_amount,
            "staking incentives claimed"
        );
        Ok(totals)
    }

    /// Batch claim across chains. Chain ids must be strictly ascending and
    /// non-repeating, each chain's target list non-empty, strictly ascending
    /// and non-repeating. Withheld netting runs per chain inside the loop;
    /// the aggregate return refunds once after the full batch. All-or-
    /// nothing: any failure rolls the whole batch's ledger effects back.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_staking_incentives_batch(
        &mut self,
        chain_ids: &[u64],
        targets: &[Vec<Address>],
        bridge_payloads: &[Vec<u8>],
        tokenomics: &mut dyn EpochLedger,
        votes: &mut dyn VoteRegistry,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        staking: &mut dyn LocalStaking,
    ) -> Result<StakingIncentives, KeelError> {
        self.check_staking_incentives_unpaused()?;
        if chain_ids.is_empty() {
            return Err(KeelError::ZeroValue { what: "chain ids" });
        }
        if chain_ids.len() != targets.len() {
            return Err(KeelError::LengthMismatch {
                left: chain_ids.len(),
                right: targets.len(),
            });
        }
        if chain_ids.len() != bridge_payloads.len() {
            return Err(KeelError::LengthMismatch {
                left: chain_ids.len(),
                right: bridge_payloads.len(),
            });
        }
        for (index, &chain_id) in chain_ids.iter().enumerate() {
            self.check_chain_id(chain_id)?;
            self.check_processor_registered(chain_id)?;
            // Strict ascent is what makes a duplicated (chain, target) pair
            // inexpressible within one call.
            if index > 0 && chain_id <= chain_ids[index - 1] {
                return Err(KeelError::OutOfOrder { index });
            }
            let chain_targets = &targets[index];
            if chain_targets.is_empty() {
                return Err(KeelError::ZeroValue {
                    what: "staking targets",
                });
            }
            for (t_index, target) in chain_targets.iter().enumerate() {
                if t_index > 0 && *target <= chain_targets[t_index - 1] {
                    return Err(KeelError::OutOfOrder { index: t_index });
                }
            }
        }

        self.lock.enter()?;
        let snapshot = self.snapshot();
        let result = self.claim_batch_inner(
            chain_ids,
            targets,
            bridge_payloads,
            tokenomics,
            votes,
            treasury,
            reward_token,
            staking,
        );
        if result.is_err() {
            self.restore(snapshot);
        }
        self.lock.exit();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn claim_batch_inner(
        &mut self,
        chain_ids: &[u64],
        targets: &[Vec<Address>],
        bridge_payloads: &[Vec<u8>],
        tokenomics: &mut dyn EpochLedger,
        votes: &mut dyn VoteRegistry,
        treasury: &mut Treasury,
        reward_token: &mut dyn RewardToken,
        staking: &mut dyn LocalStaking,
    ) -> Result<StakingIncentives, KeelError> {
        let mut totals = StakingIncentives::default();
        for (index, &chain_id) in chain_ids.iter().enumerate() {
            let mut pairs = Vec::with_capacity(targets[index].len());
            let mut chain_stake: Amount = 0;
            for target in &targets[index] {
                let claim =
                    self.compute_staking_incentives(chain_id, target, tokenomics, votes)?;
                pairs.push((*target, claim.stake));
                chain_stake += claim.stake;
                totals.return_amount += claim.return_amount;
            }
            self.settle_chain(
                chain_id,
                &pairs,
                chain_stake,
                &bridge_payloads[index],
                tokenomics,
                treasury,
                reward_token,
                staking,
            )?;
            totals.stake += chain_stake;
        }
        if totals.return_amount > 0 {
            tokenomics.refund_from_service_staking(totals.return_amount);
        }

        tracing::info!(
            chains = chain_ids.len(),
            stake = totals.stake,
            returned = totals.return_amount,
            "staking incentive batch claimed"
        );
        Ok(totals)
    }
}
