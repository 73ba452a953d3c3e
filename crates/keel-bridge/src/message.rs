// crates/keel-bridge/src/message.rs
//
// Wire payloads carried across the bridge. JSON-encoded; the underlying
// transport treats them as opaque bytes.

use serde::{Deserialize, Serialize};

use keel_core::{Address, Amount, KeelError};

/// Outbound staking dispatch: parallel (target, amount) pairs plus the
/// bridge-specific parameter blob supplied by the claimer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingMessage {
    pub targets: Vec<Address>,
    pub amounts: Vec<Amount>,
    pub params: Vec<u8>,
}

impl StakingMessage {
    pub fn encode(&self) -> Result<Vec<u8>, KeelError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, KeelError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Inbound report of reward tokens the remote side could not or did not
/// use, to be credited against future transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithheldReport {
    pub amount: Amount,
}

impl WithheldReport {
    pub fn encode(&self) -> Result<Vec<u8>, KeelError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, KeelError> {
        Ok(serde_json::from_slice(data)?)
    }
}
