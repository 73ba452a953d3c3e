// crates/keel-treasury/src/treasury.rs
//
// The treasury vault.
//
// Native custody is split into two buckets: `native_from_services` (service
// deposits, backing owner-incentive rewards) and `native_owned` (the
// protocol's own share, moved over at each epoch turn). Collateral tokens
// are tracked per-token with an enablement flag and a reserve balance.

use std::collections::HashMap;

use keel_core::epoch::RewardSplit;
use keel_core::traits::{CollateralBank, EpochLedger, NativeBank, RewardToken};
use keel_core::{Address, Amount, KeelError, Timestamp};

#[derive(Debug, Clone, Copy, Default)]
struct TokenState {
    enabled: bool,
    reserve: Amount,
}

/// The treasury vault. Exclusively owns custodied balances and the
/// token-enablement registry.
pub struct Treasury {
    address: Address,
    owner: Address,
    depository: Address,
    dispenser: Address,

    native_owned: Amount,
    native_from_services: Amount,
    /// Native rewards allocated at epoch turns, not yet claimed.
    account_rewards_pool: Amount,
    /// Reward-token top-ups allocated at epoch turns, not yet minted.
    account_top_ups_pool: Amount,

    tokens: HashMap<Address, TokenState>,
}

impl Treasury {
    pub fn new(address: Address, owner: Address, depository: Address, dispenser: Address) -> Self {
        Self {
            address,
            owner,
            depository,
            dispenser,
            native_owned: 0,
            native_from_services: 0,
            account_rewards_pool: 0,
            account_top_ups_pool: 0,
            tokens: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Replace the depository/dispenser manager addresses. Owner-only.
    pub fn change_managers(
        &mut self,
        caller: &Address,
        depository: Address,
        dispenser: Address,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "change managers")?;
        self.depository = depository;
        self.dispenser = dispenser;
        Ok(())
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

    /// Enable a collateral token for bond programs. Owner-only.
    pub fn enable_token(&mut self, caller: &Address, token: &Address) -> Result<(), KeelError> {
        self.require_owner(caller, "enable token")?;
        let state = self.tokens.entry(*token).or_default();
        if state.enabled {
            return Err(KeelError::TokenStateUnchanged { token: *token });
        }
        state.enabled = true;
        tracing::info!(%token, "collateral token enabled");
        Ok(())
    }

    /// Disable a collateral token. Owner-only; requires a zero reserve.
    pub fn disable_token(&mut self, caller: &Address, token: &Address) -> Result<(), KeelError> {
        self.require_owner(caller, "disable token")?;
        let state = self
            .tokens
            .get_mut(token)
            .filter(|s| s.enabled)
            .ok_or(KeelError::TokenStateUnchanged { token: *token })?;
        if state.reserve != 0 {
            return Err(KeelError::NonZeroReserve {
                token: *token,
                reserve: state.reserve,
            });
        }
        state.enabled = false;
        tracing::info!(%token, "collateral token disabled");
        Ok(())
    }

    pub fn is_token_enabled(&self, token: &Address) -> bool {
        self.tokens.get(token).map(|s| s.enabled).unwrap_or(false)
    }

    pub fn token_reserve(&self, token: &Address) -> Amount {
        self.tokens.get(token).map(|s| s.reserve).unwrap_or(0)
    }

    pub fn native_owned(&self) -> Amount {
        self.native_owned
    }

    pub fn native_from_services(&self) -> Amount {
        self.native_from_services
    }

    pub fn account_rewards_pool(&self) -> Amount {
        self.account_rewards_pool
    }

    pub fn account_top_ups_pool(&self) -> Amount {
        self.account_top_ups_pool
    }

    /// Take `token_amount` of collateral from `account` into the reserve and
    /// mint `mint_amount` of the reward token to the depository.
    ///
    /// Depository-only. The mint is checked against the accountant's
    /// inflation policy before any funds move; a declined mint rejects the
    /// whole call with nothing pulled.
    pub fn deposit_token_for_mint(
        &mut self,
        caller: &Address,
        account: &Address,
        token_amount: Amount,
        token: &Address,
        mint_amount: Amount,
        tokenomics: &mut dyn EpochLedger,
        reward_token: &mut dyn RewardToken,
        collateral: &mut dyn CollateralBank,
    ) -> Result<(), KeelError> {
        if *caller != self.depository {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "deposit collateral for mint",
            });
        }
        if !self.is_token_enabled(token) {
            return Err(KeelError::TokenNotEnabled { token: *token });
        }
        if !tokenomics.request_mint_allowance(mint_amount) {
            return Err(KeelError::MintRejected {
                amount: mint_amount,
            });
        }

        if let Err(e) = collateral.transfer_from(token, account, &self.address, token_amount) {
            tokenomics.refund_mint_allowance(mint_amount);
            return Err(e);
        }
        if let Err(e) = reward_token.mint(&self.depository, mint_amount) {
            tokenomics.refund_mint_allowance(mint_amount);
            collateral.transfer(token, &self.address, account, token_amount)?;
            return Err(e);
        }

        self.tokens
            .get_mut(token)
            .map(|s| s.reserve += token_amount)
            .ok_or(KeelError::TokenNotEnabled { token: *token })?;

        tracing::info!(
            %token,
            token_amount,
            mint_amount,
            "collateral deposited against reward mint"
        );
        Ok(())
    }

    /// Record an aggregate native deposit from services. The accountant
    /// classifies it into a revenue share and a donation share; both are
    /// custodied in the from-services bucket.
    pub fn deposit_service_donations(
        &mut self,
        service_ids: &[u64],
        amounts: &[Amount],
        value: Amount,
        tokenomics: &mut dyn EpochLedger,
    ) -> Result<(Amount, Amount), KeelError> {
        if service_ids.len() != amounts.len() {
            return Err(KeelError::LengthMismatch {
                left: service_ids.len(),
                right: amounts.len(),
            });
        }
        let mut sum: Amount = 0;
        for &amount in amounts {
            sum = sum.checked_add(amount).ok_or(KeelError::Overflow {
                value: amount,
                bound: Amount::MAX,
            })?;
        }
        if sum != value {
            return Err(KeelError::ValueMismatch { sent: value, sum });
        }

        let (revenue, donation) = tokenomics.track_service_revenue(service_ids, amounts)?;
        self.native_from_services += value;

        tracing::info!(value, revenue, donation, "service deposit recorded");
        Ok((revenue, donation))
    }

    /// Withdraw from the protocol-owned native bucket or a collateral
    /// reserve. Owner-only. A failed transfer aborts with the internal
    /// balance restored.
    pub fn withdraw(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        token: Option<&Address>,
        native: &mut dyn NativeBank,
        collateral: &mut dyn CollateralBank,
    ) -> Result<(), KeelError> {
        self.require_owner(caller, "withdraw")?;
        if amount == 0 {
            return Err(KeelError::ZeroValue { what: "amount" });
        }
        if to.is_zero() {
            return Err(KeelError::ZeroAddress { what: "recipient" });
        }

        match token {
            None => {
                if self.native_owned < amount {
                    return Err(KeelError::InsufficientBalance {
                        requested: amount,
                        available: self.native_owned,
                    });
                }
                self.native_owned -= amount;
                if let Err(e) = native.transfer(&self.address, to, amount) {
                    self.native_owned += amount;
                    return Err(e);
                }
            }
            Some(token) => {
                let reserve = self.token_reserve(token);
                if !self.is_token_enabled(token) {
                    return Err(KeelError::TokenNotEnabled { token: *token });
                }
                if reserve < amount {
                    return Err(KeelError::InsufficientBalance {
                        requested: amount,
                        available: reserve,
                    });
                }
                if let Some(state) = self.tokens.get_mut(token) {
                    state.reserve -= amount;
                }
                if let Err(e) = collateral.transfer(token, &self.address, to, amount) {
                    if let Some(state) = self.tokens.get_mut(token) {
                        state.reserve += amount;
                    }
                    return Err(e);
                }
            }
        }
        tracing::info!(%to, amount, "treasury withdrawal");
        Ok(())
    }

    /// Epoch-turn hook. Owner-only. Checkpoints the accountant, moves the
    /// treasury's share of the closed epoch's donations into the owned
    /// bucket, and credits the account-facing reward/top-up pools the
    /// dispenser draws on.
    pub fn allocate_rewards(
        &mut self,
        caller: &Address,
        now: Timestamp,
        tokenomics: &mut dyn EpochLedger,
    ) -> Result<RewardSplit, KeelError> {
        self.require_owner(caller, "allocate rewards")?;
        let split = tokenomics
            .checkpoint(now)
            .ok_or(KeelError::EpochStillRunning {
                now,
                due: tokenomics.epoch_due(),
            })?;

        if self.native_from_services < split.treasury_rewards {
            return Err(KeelError::InvariantViolation(format!(
                "treasury share {} exceeds from-services bucket {}",
                split.treasury_rewards, self.native_from_services
            )));
        }
        self.native_from_services -= split.treasury_rewards;
        self.native_owned += split.treasury_rewards;
        self.account_rewards_pool += split.account_rewards;
        self.account_top_ups_pool += split.account_top_ups;

        tracing::info!(
            treasury_rewards = split.treasury_rewards,
            account_rewards = split.account_rewards,
            account_top_ups = split.account_top_ups,
            "epoch rewards allocated"
        );
        Ok(split)
    }

    /// Pay out a claimed owner incentive: transfer `reward` native from the
    /// from-services bucket and mint `top_up` of the reward token.
    /// Dispenser-only.
    pub fn pay_owner_incentives(
        &mut self,
        caller: &Address,
        account: &Address,
        reward: Amount,
        top_up: Amount,
        reward_token: &mut dyn RewardToken,
        native: &mut dyn NativeBank,
    ) -> Result<(), KeelError> {
        if *caller != self.dispenser {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "pay owner incentives",
            });
        }

        if reward > self.account_rewards_pool {
            return Err(KeelError::InsufficientBalance {
                requested: reward,
                available: self.account_rewards_pool,
            });
        }
        if reward > self.native_from_services {
            return Err(KeelError::InsufficientBalance {
                requested: reward,
                available: self.native_from_services,
            });
        }
        if top_up > self.account_top_ups_pool {
            return Err(KeelError::InsufficientBalance {
                requested: top_up,
                available: self.account_top_ups_pool,
            });
        }

        self.account_rewards_pool -= reward;
        self.native_from_services -= reward;
        self.account_top_ups_pool -= top_up;

        if reward > 0 {
            if let Err(e) = native.transfer(&self.address, account, reward) {
                self.account_rewards_pool += reward;
                self.native_from_services += reward;
                self.account_top_ups_pool += top_up;
                return Err(e);
            }
        }
        if top_up > 0 {
            if let Err(e) = reward_token.mint(account, top_up) {
                self.account_top_ups_pool += top_up;
                return Err(e);
            }
        }

        tracing::info!(%account, reward, top_up, "owner incentives paid");
        Ok(())
    }

    /// Mint the net staking transfer of a cross-chain claim to the
    /// dispenser. Dispenser-only; gated by the inflation policy.
    pub fn pay_staking_transfer(
        &mut self,
        caller: &Address,
        amount: Amount,
        tokenomics: &mut dyn EpochLedger,
        reward_token: &mut dyn RewardToken,
    ) -> Result<(), KeelError> {
        if *caller != self.dispenser {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "pay staking transfer",
            });
        }
        if amount == 0 {
            return Err(KeelError::ZeroValue { what: "amount" });
        }
        if !tokenomics.request_mint_allowance(amount) {
            return Err(KeelError::MintRejected { amount });
        }
        if let Err(e) = reward_token.mint(caller, amount) {
            tokenomics.refund_mint_allowance(amount);
            return Err(e);
        }
        tracing::info!(amount, "staking transfer minted to dispenser");
        Ok(())
    }
}
