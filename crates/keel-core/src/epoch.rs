// crates/keel-core/src/epoch.rs
//
// Epoch snapshot data model.
//
// The epoch accountant closes one EpochPoint and one StakingPoint per epoch.
// Both are append-only and immutable once written; downstream components
// (depository, treasury, dispenser) only ever read them.

use serde::{Deserialize, Serialize};

use crate::token::Amount;
use crate::Timestamp;

/// The kind of protocol unit an owner incentive accrues to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Component,
    Agent,
}

/// Snapshot of one closed epoch. Write-once, indexed by the epoch counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochPoint {
    /// Total native-asset donation inflow recorded during the epoch.
    pub total_donations: Amount,
    /// Total reward-token top-up budget minted for the epoch.
    pub total_top_ups: Amount,
    /// Inverse discount factor, 10^18 scale. 10^18 means no discount.
    pub idf: u128,
    /// Number of services that donated during the epoch.
    pub num_donating_services: u64,
    /// Timestamp at which the epoch was closed.
    pub end_time: Timestamp,
    /// Percentage of donation rewards retained by the treasury.
    pub rewards_treasury_fraction: u8,
    /// Percentage of donation rewards accruing to component owners.
    pub rewards_component_fraction: u8,
    /// Percentage of donation rewards accruing to agent owners.
    pub rewards_agent_fraction: u8,
}

/// Per-epoch staking budget snapshot, produced in lock-step with EpochPoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingPoint {
    /// Total staking budget for the epoch.
    pub staking_amount: Amount,
    /// Per-target cap on the stake a single target may draw.
    pub max_staking_amount: Amount,
    /// Minimum relative vote weight (10^18 scale) a target needs to qualify.
    pub min_staking_weight: u128,
    /// Percentage of the epoch's inflation routed to staking.
    pub staking_fraction: u8,
}

/// The reward split returned by an epoch checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    /// Native-asset share retained by the treasury.
    pub treasury_rewards: Amount,
    /// Native-asset share claimable by unit owners.
    pub account_rewards: Amount,
    /// Reward-token top-up share claimable by unit owners.
    pub account_top_ups: Amount,
}
