// crates/keel-tokenomics/src/tokenomics.rs
//
// The epoch accounting engine.
//
// One epoch runs at a time. Service deposits accrue donations and per-unit
// owner incentives into the running epoch; `checkpoint` closes the epoch
// once its length has elapsed, snapshots it, tops up the budget pools from
// the inflation schedule, and returns the reward split for the treasury to
// allocate.

use std::collections::HashMap;

use keel_core::epoch::{EpochPoint, RewardSplit, StakingPoint, UnitType};
use keel_core::traits::EpochLedger;
use keel_core::{Address, Amount, KeelError, ProtocolConfig, Timestamp, TOKEN_SCALE};

/// A component or agent unit of a registered service, with its owning
/// account. Donations to the service accrue incentives to these units.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceUnit {
    pub unit_type: UnitType,
    pub unit_id: u64,
    pub owner: Address,
}

#[derive(Debug, Clone, Default)]
struct UnitIncentive {
    owner: Address,
    reward: Amount,
    top_up: Amount,
}

/// The epoch accountant. Exclusively owns the epoch/staking snapshots and
/// the bond/mint/staking budget pools.
pub struct Tokenomics {
    owner: Address,
    config: ProtocolConfig,

    /// Counter of the running epoch. Epochs start at 1; snapshots exist for
    /// every epoch below this counter.
    epoch_counter: u64,
    epoch_start: Timestamp,
    epoch_points: HashMap<u64, EpochPoint>,
    staking_points: HashMap<u64, StakingPoint>,

    // Running-epoch accumulators, reset at every checkpoint.
    epoch_donations: Amount,
    epoch_top_up_accrual: Amount,
    donating_services: u64,

    // Budget pools.
    effective_bond: Amount,
    mint_allowance: Amount,
    staking_refunds: Amount,

    service_units: HashMap<u64, Vec<ServiceUnit>>,
    unit_incentives: HashMap<(UnitType, u64), UnitIncentive>,
    /// Per-account re-credits from claims whose payment leg failed.
    account_adjustments: HashMap<Address, (Amount, Amount)>,
}

impl Tokenomics {
    /// Create the accountant at `genesis`. Epoch 1 starts running
    /// immediately; the initial pool seeds come from the config.
    pub fn new(
        owner: Address,
        config: ProtocolConfig,
        genesis: Timestamp,
    ) -> Result<Self, KeelError> {
        config.validate()?;
        Ok(Self {
            owner,
            effective_bond: config.initial_bond_headroom,
            mint_allowance: config.initial_mint_allowance,
            config,
            epoch_counter: 1,
            epoch_start: genesis,
            epoch_points: HashMap::new(),
            staking_points: HashMap::new(),
            epoch_donations: 0,
            epoch_top_up_accrual: 0,
            donating_services: 0,
            staking_refunds: 0,
            service_units: HashMap::new(),
            unit_incentives: HashMap::new(),
            account_adjustments: HashMap::new(),
        })
    }

    /// Register the component/agent units of a service so that donations to
    /// it accrue owner incentives. Owner-only; overwrites any prior list.
    pub fn register_service_units(
        &mut self,
        caller: &Address,
        service_id: u64,
        units: Vec<ServiceUnit>,
    ) -> Result<(), KeelError> {
        if *caller != self.owner {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "register service units",
            });
        }
        // Seed the accrual entries so ownership is known from registration
        // on, even before the first donation.
        for unit in &units {
            let entry = self
                .unit_incentives
                .entry((unit.unit_type, unit.unit_id))
                .or_insert_with(|| UnitIncentive {
                    owner: unit.owner,
                    reward: 0,
                    top_up: 0,
                });
            entry.owner = unit.owner;
        }
        self.service_units.insert(service_id, units);
        Ok(())
    }

    /// Top-up budget for the running epoch: the inflation remainder after
    /// the staking and bond-program fractions.
    fn epoch_top_up_budget(&self) -> Amount {
        let fraction =
            100 - self.config.staking_fraction as u128 - self.config.bond_fraction as u128;
        self.config.inflation_per_epoch * fraction / 100
    }

    /// Accrue one donating service's shares to its units. The donation is
    /// split by the configured component/agent fractions, evenly across the
    /// units of each type. Top-up accrual tracks the donation at the IDF
    /// rate, capped by the epoch's remaining top-up budget.
    fn accrue_donation(&mut self, service_id: u64, amount: Amount) {
        let units = match self.service_units.get(&service_id) {
            Some(units) if !units.is_empty() => units.clone(),
            _ => return,
        };

        for unit_type in [UnitType::Component, UnitType::Agent] {
            let fraction = match unit_type {
                UnitType::Component => self.config.rewards_component_fraction,
                UnitType::Agent => self.config.rewards_agent_fraction,
            } as u128;
            let typed: Vec<&ServiceUnit> =
                units.iter().filter(|u| u.unit_type == unit_type).collect();
            if typed.is_empty() {
                continue;
            }
            let reward_share = amount * fraction / 100 / typed.len() as u128;

            let budget_left = self.epoch_top_up_budget() - self.epoch_top_up_accrual;
            let top_up_total = (amount * fraction / 100 * self.config.idf / TOKEN_SCALE)
                .min(budget_left);
            let top_up_share = top_up_total / typed.len() as u128;
            self.epoch_top_up_accrual += top_up_share * typed.len() as u128;

            for unit in typed {
                let entry = self
                    .unit_incentives
                    .entry((unit.unit_type, unit.unit_id))
                    .or_insert_with(|| UnitIncentive {
                        owner: unit.owner,
                        reward: 0,
                        top_up: 0,
                    });
                entry.reward += reward_share;
                entry.top_up += top_up_share;
            }
        }
    }
}

impl EpochLedger for Tokenomics {
    fn current_epoch(&self) -> u64 {
        self.epoch_counter
    }

    fn epoch_due(&self) -> Timestamp {
        self.epoch_start + self.config.epoch_length
    }

    fn epoch_point(&self, epoch: u64) -> Option<EpochPoint> {
        self.epoch_points.get(&epoch).cloned()
    }

    fn staking_point(&self, epoch: u64) -> Option<StakingPoint> {
        self.staking_points.get(&epoch).cloned()
    }

    fn reserve_for_bond_program(&mut self, amount: Amount) -> bool {
        if amount > self.effective_bond {
            return false;
        }
        self.effective_bond -= amount;
        true
    }

    fn bond_program_headroom(&self) -> Amount {
        self.effective_bond
    }

    fn refund_from_bond_program(&mut self, amount: Amount) {
        self.effective_bond = self.effective_bond.saturating_add(amount);
    }

    fn request_mint_allowance(&mut self, amount: Amount) -> bool {
        if amount > self.mint_allowance {
            return false;
        }
        self.mint_allowance -= amount;
        true
    }

    fn refund_mint_allowance(&mut self, amount: Amount) {
        self.mint_allowance = self.mint_allowance.saturating_add(amount);
    }

    fn track_service_revenue(
        &mut self,
        service_ids: &[u64],
        amounts: &[Amount],
    ) -> Result<(Amount, Amount), KeelError> {
        if service_ids.len() != amounts.len() {
            return Err(KeelError::LengthMismatch {
                left: service_ids.len(),
                right: amounts.len(),
            });
        }

        // A deposit from a service with registered units is a donation and
        // accrues owner incentives; anything else is plain protocol revenue.
        let mut revenue: Amount = 0;
        let mut donation: Amount = 0;
        for (&service_id, &amount) in service_ids.iter().zip(amounts) {
            if self
                .service_units
                .get(&service_id)
                .is_some_and(|units| !units.is_empty())
            {
                donation += amount;
                self.donating_services += 1;
                self.accrue_donation(service_id, amount);
            } else {
                revenue += amount;
            }
        }
        self.epoch_donations += donation;

        tracing::debug!(
            services = service_ids.len(),
            revenue,
            donation,
            "tracked service revenue"
        );
        Ok((revenue, donation))
    }

    fn refund_from_service_staking(&mut self, amount: Amount) {
        self.staking_refunds = self.staking_refunds.saturating_add(amount);
    }

    fn checkpoint(&mut self, now: Timestamp) -> Option<RewardSplit> {
        if now < self.epoch_due() {
            return None;
        }

        let closed = self.epoch_counter;
        let donations = self.epoch_donations;
        let treasury_rewards = donations * self.config.rewards_treasury_fraction as u128 / 100;
        let account_rewards = donations
            * (self.config.rewards_component_fraction as u128
                + self.config.rewards_agent_fraction as u128)
            / 100;
        let account_top_ups = self.epoch_top_up_accrual;

        self.epoch_points.insert(
            closed,
            EpochPoint {
                total_donations: donations,
                total_top_ups: account_top_ups,
                idf: self.config.idf,
                num_donating_services: self.donating_services,
                end_time: now,
                rewards_treasury_fraction: self.config.rewards_treasury_fraction,
                rewards_component_fraction: self.config.rewards_component_fraction,
                rewards_agent_fraction: self.config.rewards_agent_fraction,
            },
        );

        // Refunds returned by the dispenser rejoin the next staking budget.
        let staking_amount = self.config.inflation_per_epoch
            * self.config.staking_fraction as u128
            / 100
            + self.staking_refunds;
        self.staking_points.insert(
            closed,
            StakingPoint {
                staking_amount,
                max_staking_amount: self.config.max_staking_amount,
                min_staking_weight: self.config.min_staking_weight,
                staking_fraction: self.config.staking_fraction,
            },
        );

        self.effective_bond = self.effective_bond.saturating_add(
            self.config.inflation_per_epoch * self.config.bond_fraction as u128 / 100,
        );
        self.mint_allowance = self
            .mint_allowance
            .saturating_add(self.config.inflation_per_epoch);

        self.epoch_counter += 1;
        self.epoch_start = now;
        self.epoch_donations = 0;
        self.epoch_top_up_accrual = 0;
        self.donating_services = 0;
        self.staking_refunds = 0;

        tracing::info!(
            epoch = closed,
            donations,
            staking_amount,
            account_top_ups,
            "epoch closed"
        );

        Some(RewardSplit {
            treasury_rewards,
            account_rewards,
            account_top_ups,
        })
    }

    fn account_owner_incentives(
        &mut self,
        account: &Address,
        unit_types: &[UnitType],
        unit_ids: &[u64],
    ) -> Result<(Amount, Amount), KeelError> {
        if unit_types.len() != unit_ids.len() {
            return Err(KeelError::LengthMismatch {
                left: unit_types.len(),
                right: unit_ids.len(),
            });
        }

        // Validate ownership of every listed unit before draining anything,
        // so a rejected unit leaves all accruals untouched.
        for (&unit_type, &unit_id) in unit_types.iter().zip(unit_ids) {
            self.unit_incentives
                .get(&(unit_type, unit_id))
                .filter(|e| e.owner == *account)
                .ok_or(KeelError::Unauthorized {
                    caller: *account,
                    action: "claim incentives for unowned unit",
                })?;
        }

        let (mut reward, mut top_up) = self
            .account_adjustments
            .remove(account)
            .unwrap_or((0, 0));
        for (&unit_type, &unit_id) in unit_types.iter().zip(unit_ids) {
            if let Some(entry) = self.unit_incentives.get_mut(&(unit_type, unit_id)) {
                reward += entry.reward;
                top_up += entry.top_up;
                entry.reward = 0;
                entry.top_up = 0;
            }
        }
        Ok((reward, top_up))
    }

    fn restore_owner_incentives(&mut self, account: &Address, reward: Amount, top_up: Amount) {
        let entry = self.account_adjustments.entry(*account).or_default();
        entry.0 = entry.0.saturating_add(reward);
        entry.1 = entry.1.saturating_add(top_up);
    }
}
