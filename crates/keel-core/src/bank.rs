// crates/keel-core/src/bank.rs
//
// In-memory reference ledgers for the token and native-asset capabilities.
//
// The incentive core treats token mechanics as external collaborators; these
// ledgers are the reference implementations used for local simulation and
// integration testing. They enforce the same failure contracts production
// adapters must honor (insufficient balance, supply cap, allowance).

use std::collections::HashMap;

use crate::address::Address;
use crate::error::KeelError;
use crate::token::{Amount, MAX_SUPPLY};
use crate::traits::{CollateralBank, NativeBank, RewardToken};

/// In-memory KEEL reward-token ledger with mint/transfer/approve semantics.
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn debit(&mut self, from: &Address, amount: Amount) -> Result<(), KeelError> {
        let balance = self.balances.entry(*from).or_default();
        if *balance < amount {
            return Err(KeelError::InsufficientBalance {
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }
}

impl RewardToken for TokenLedger {
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), KeelError> {
        let supply = self.total_supply.saturating_add(amount);
        if supply > MAX_SUPPLY {
            return Err(KeelError::Overflow {
                value: supply,
                bound: MAX_SUPPLY,
            });
        }
        self.total_supply = supply;
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        self.debit(from, amount)?;
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        let allowance = self
            .allowances
            .get(&(*from, *spender))
            .copied()
            .unwrap_or(0);
        if allowance < amount {
            return Err(KeelError::InsufficientBalance {
                requested: amount,
                available: allowance,
            });
        }
        self.debit(from, amount)?;
        self.allowances.insert((*from, *spender), allowance - amount);
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }

    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

/// In-memory ledger for external collateral tokens, keyed by token address.
#[derive(Debug, Default)]
pub struct CollateralLedger {
    balances: HashMap<(Address, Address), Amount>,
}

impl CollateralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a holder's balance of a collateral token.
    pub fn set_balance(&mut self, token: &Address, holder: &Address, amount: Amount) {
        self.balances.insert((*token, *holder), amount);
    }

    pub fn balance_of(&self, token: &Address, holder: &Address) -> Amount {
        self.balances.get(&(*token, *holder)).copied().unwrap_or(0)
    }

    fn do_transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        let balance = self.balances.entry((*token, *from)).or_default();
        if *balance < amount {
            return Err(KeelError::InsufficientBalance {
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        *self.balances.entry((*token, *to)).or_default() += amount;
        Ok(())
    }
}

impl CollateralBank for CollateralLedger {
    fn transfer_from(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        self.do_transfer(token, from, to, amount)
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), KeelError> {
        self.do_transfer(token, from, to, amount)
    }
}

/// In-memory native-asset ledger.
#[derive(Debug, Default)]
pub struct NativeLedger {
    balances: HashMap<Address, Amount>,
}

impl NativeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&mut self, holder: &Address, amount: Amount) {
        self.balances.insert(*holder, amount);
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }
}

impl NativeBank for NativeLedger {
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), KeelError> {
        let balance = self.balances.entry(*from).or_default();
        if *balance < amount {
            return Err(KeelError::TransferFailed(format!(
                "native transfer of {} from {} exceeds balance {}",
                amount, from, balance
            )));
        }
        *balance -= amount;
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }
}
