// crates/keel-core/src/config.rs
//
// Runtime configuration for the incentive core.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use crate::error::KeelError;
use crate::token::{Amount, TOKEN_SCALE};

/// Economic parameters shared by the tokenomics, depository, and dispenser
/// components. All owner/pause/counter state lives on the component structs
/// themselves; this struct only carries tunable policy values.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolConfig {
    /// Epoch length in seconds.
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,

    /// Reward-token inflation budget per epoch, in base units.
    #[serde(default = "default_inflation_per_epoch")]
    pub inflation_per_epoch: Amount,

    /// Percentage of donation rewards retained by the treasury.
    #[serde(default = "default_treasury_fraction")]
    pub rewards_treasury_fraction: u8,

    /// Percentage of donation rewards accruing to component owners.
    #[serde(default = "default_component_fraction")]
    pub rewards_component_fraction: u8,

    /// Percentage of donation rewards accruing to agent owners.
    #[serde(default = "default_agent_fraction")]
    pub rewards_agent_fraction: u8,

    /// Percentage of each epoch's inflation routed to service staking.
    #[serde(default = "default_staking_fraction")]
    pub staking_fraction: u8,

    /// Percentage of each epoch's inflation accrued to the bond program cap.
    #[serde(default = "default_bond_fraction")]
    pub bond_fraction: u8,

    /// Per-target cap on the stake a single target may draw per epoch.
    #[serde(default = "default_max_staking_amount")]
    pub max_staking_amount: Amount,

    /// Minimum relative vote weight (10^18 scale) a staking target needs.
    #[serde(default = "default_min_staking_weight")]
    pub min_staking_weight: u128,

    /// Inverse discount factor recorded per epoch, 10^18 scale.
    #[serde(default = "default_idf")]
    pub idf: u128,

    /// Minimum bond vesting period in seconds.
    #[serde(default = "default_min_vesting")]
    pub min_vesting: u64,

    /// Bond-issuance headroom available before the first checkpoint.
    #[serde(default = "default_initial_bond_headroom")]
    pub initial_bond_headroom: Amount,

    /// Mint allowance available before the first checkpoint.
    #[serde(default = "default_initial_mint_allowance")]
    pub initial_mint_allowance: Amount,
}

fn default_epoch_length() -> u64 {
    7 * 24 * 60 * 60
}

fn default_inflation_per_epoch() -> Amount {
    1_000_000 * TOKEN_SCALE
}

fn default_treasury_fraction() -> u8 {
    10
}

fn default_component_fraction() -> u8 {
    54
}

fn default_agent_fraction() -> u8 {
    36
}

fn default_staking_fraction() -> u8 {
    20
}

fn default_bond_fraction() -> u8 {
    30
}

fn default_max_staking_amount() -> Amount {
    100_000 * TOKEN_SCALE
}

fn default_min_staking_weight() -> u128 {
    // 1% on the 10^18 weight scale
    TOKEN_SCALE / 100
}

fn default_idf() -> u128 {
    TOKEN_SCALE
}

fn default_min_vesting() -> u64 {
    24 * 60 * 60
}

fn default_initial_bond_headroom() -> Amount {
    1_000_000 * TOKEN_SCALE
}

fn default_initial_mint_allowance() -> Amount {
    1_000_000 * TOKEN_SCALE
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            epoch_length: default_epoch_length(),
            inflation_per_epoch: default_inflation_per_epoch(),
            rewards_treasury_fraction: default_treasury_fraction(),
            rewards_component_fraction: default_component_fraction(),
            rewards_agent_fraction: default_agent_fraction(),
            staking_fraction: default_staking_fraction(),
            bond_fraction: default_bond_fraction(),
            max_staking_amount: default_max_staking_amount(),
            min_staking_weight: default_min_staking_weight(),
            idf: default_idf(),
            min_vesting: default_min_vesting(),
            initial_bond_headroom: default_initial_bond_headroom(),
            initial_mint_allowance: default_initial_mint_allowance(),
        }
    }
}

impl ProtocolConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, KeelError> {
        let contents =
            fs::read_to_string(path).map_err(|e| KeelError::Serialization(e.to_string()))?;
        let config: ProtocolConfig =
            toml::from_str(&contents).map_err(|e| KeelError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fraction sums. The donation reward split must not exceed
    /// 100%, and the inflation split (staking + bond program) must leave a
    /// non-negative top-up remainder.
    pub fn validate(&self) -> Result<(), KeelError> {
        let reward_sum = self.rewards_treasury_fraction as u128
            + self.rewards_component_fraction as u128
            + self.rewards_agent_fraction as u128;
        if reward_sum > 100 {
            return Err(KeelError::Overflow {
                value: reward_sum,
                bound: 100,
            });
        }
        let inflation_sum = self.staking_fraction as u128 + self.bond_fraction as u128;
        if inflation_sum > 100 {
            return Err(KeelError::Overflow {
                value: inflation_sum,
                bound: 100,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.rewards_treasury_fraction
                + config.rewards_component_fraction
                + config.rewards_agent_fraction,
            100
        );
    }

    #[test]
    fn test_reward_fraction_sum_over_100_rejected() {
        let config = ProtocolConfig {
            rewards_treasury_fraction: 50,
            rewards_component_fraction: 40,
            rewards_agent_fraction: 20,
            ..ProtocolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(KeelError::Overflow { value: 110, bound: 100 })
        ));
    }

    #[test]
    fn test_inflation_fraction_sum_over_100_rejected() {
        let config = ProtocolConfig {
            staking_fraction: 70,
            bond_fraction: 40,
            ..ProtocolConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ProtocolConfig = toml::from_str("epoch_length = 3600").unwrap();
        assert_eq!(config.epoch_length, 3600);
        assert_eq!(config.staking_fraction, default_staking_fraction());
    }
}
