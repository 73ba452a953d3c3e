// crates/keel-dispenser/src/testutil.rs
//
// Shared in-crate test doubles for the vote registry, home-chain staking,
// and deposit processors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keel_core::traits::{DepositProcessor, LocalStaking, RewardToken, VoteRegistry};
use keel_core::{Address, Amount, KeelError, Timestamp};

/// Vote registry returning pre-configured weights regardless of time.
#[derive(Debug, Default)]
pub struct StaticVotes {
    weights: HashMap<(u64, Address), u128>,
    pub checkpoints: Vec<(Address, u64)>,
}

impl StaticVotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_weight(&mut self, chain_id: u64, target: &Address, weight: u128) {
        self.weights.insert((chain_id, *target), weight);
    }
}

impl VoteRegistry for StaticVotes {
    fn checkpoint_nominee(&mut self, target: &Address, chain_id: u64) {
        self.checkpoints.push((*target, chain_id));
    }

    fn relative_weight(&self, target: &Address, chain_id: u64, _at: Timestamp) -> u128 {
        self.weights
            .get(&(chain_id, *target))
            .copied()
            .unwrap_or(0)
    }
}

/// Home-chain staking contract recording deposits.
#[derive(Debug, Default)]
pub struct RecordingStaking {
    pub deposits: Vec<(Address, Amount)>,
}

impl RecordingStaking {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStaking for RecordingStaking {
    fn deposit(&mut self, target: &Address, amount: Amount) -> Result<(), KeelError> {
        self.deposits.push((*target, amount));
        Ok(())
    }
}

/// One message captured by a recording deposit processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub targets: Vec<Address>,
    pub amounts: Vec<Amount>,
    pub transfer: Amount,
    pub sequence: u64,
}

/// Deposit processor recording sent messages into a shared log so tests can
/// inspect them after handing the processor to the dispenser.
pub struct RecordingProcessor {
    address: Address,
    log: Arc<Mutex<Vec<SentMessage>>>,
    sequence: u64,
}

impl RecordingProcessor {
    pub fn new(address: Address) -> (Self, Arc<Mutex<Vec<SentMessage>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                address,
                log: log.clone(),
                sequence: 0,
            },
            log,
        )
    }
}

impl DepositProcessor for RecordingProcessor {
    fn address(&self) -> Address {
        self.address
    }

    fn send_message(
        &mut self,
        _caller: &Address,
        target: &Address,
        staking_amount: Amount,
        _bridge_payload: &[u8],
        transfer_amount: Amount,
        _reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError> {
        let sequence = self.sequence;
        self.sequence += 1;
        self.log.lock().unwrap().push(SentMessage {
            targets: vec![*target],
            amounts: vec![staking_amount],
            transfer: transfer_amount,
            sequence,
        });
        Ok(sequence)
    }

    fn send_message_batch(
        &mut self,
        _caller: &Address,
        targets: &[Address],
        staking_amounts: &[Amount],
        _bridge_payload: &[u8],
        transfer_amount: Amount,
        _reward_token: &mut dyn RewardToken,
    ) -> Result<u64, KeelError> {
        let sequence = self.sequence;
        self.sequence += 1;
        self.log.lock().unwrap().push(SentMessage {
            targets: targets.to_vec(),
            amounts: staking_amounts.to_vec(),
            transfer: transfer_amount,
            sequence,
        });
        Ok(sequence)
    }
}
