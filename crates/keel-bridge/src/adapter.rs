// crates/keel-bridge/src/adapter.rs
//
// The per-chain bridge adapter.
//
// The adapter starts with a deploying owner whose only privilege is binding
// the remote counterpart, exactly once; the binding clears ownership and is
// immutable afterwards. Outbound messages carry a monotonically increasing
// sequence number. Inbound delivery is accepted only from the registered
// remote relayer, and only when the bridge's own sender accessor reports
// the bound counterpart.

use keel_core::traits::{BridgeRelay, DepositProcessor, RewardToken, WithheldSink};
use keel_core::{Address, Amount, KeelError};

use crate::message::{StakingMessage, WithheldReport};

/// Bridge adapter for one L2 chain.
pub struct BridgeAdapter {
    address: Address,
    /// The reward token relayed to the remote chain.
    reward_token: Address,
    /// The dispenser; the only account allowed to send.
    dispenser: Address,
    /// The L2 chain this adapter serves.
    chain_id: u64,
    /// The only account allowed to deliver inbound messages.
    remote_relayer: Address,
    /// Remote dispenser counterpart: receiver of outbound relays and the
    /// required origin of inbound messages. Bound once.
    remote_counterpart: Option<Address>,
    /// Deploying owner; cleared permanently when the counterpart is bound.
    owner: Option<Address>,
    relay: Box<dyn BridgeRelay>,
    sequence: u64,
}

impl BridgeAdapter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: Address,
        reward_token: Address,
        dispenser: Address,
        chain_id: u64,
        remote_relayer: Address,
        owner: Address,
        relay: Box<dyn BridgeRelay>,
    ) -> Self {
        Self {
            address,
            reward_token,
            dispenser,
            chain_id,
            remote_relayer,
            remote_counterpart: None,
            owner: Some(owner),
            relay,
            sequence: 0,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn remote_counterpart(&self) -> Option<Address> {
        self.remote_counterpart
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    /// Bind the remote counterpart. Only the deploying owner may call this,
    /// and only once: the call clears ownership, freezing the binding.
    pub fn set_remote_counterpart(
        &mut self,
        caller: &Address,
        counterpart: &Address,
    ) -> Result<(), KeelError> {
        if self.owner != Some(*caller) {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "bind remote counterpart",
            });
        }
        if counterpart.is_zero() {
            return Err(KeelError::ZeroAddress {
                what: "remote counterpart",
            });
        }
        self.remote_counterpart = Some(*counterpart);
        self.owner = None;
        tracing::info!(chain_id = self.chain_id, %counterpart, "remote counterpart bound");
        Ok(())
    }

    fn check_sender(&self, caller: &Address) -> Result<Address, KeelError> {
        if *caller != self.dispenser {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "send bridge message",
            });
        }
        self.remote_counterpart.ok_or(KeelError::ZeroAddress {
            what: "remote counterpart",
        })
    }

    fn relay_staking(
        &mut self,
        targets: Vec<Address>,
        amounts: Vec<Amount>,
        bridge_payload: &[u8],
        transfer_amount: Amount,
        reward_token: &mut dyn RewardToken,
        counterpart: Address,
    ) -> Result<u64, KeelError> {
        // Escrow the transfer before relaying; the dispenser approved it.
        if transfer_amount > 0 {
            reward_token.transfer_from(
                &self.address,
                &self.dispenser,
                &self.address,
                transfer_amount,
            )?;
        }

        let message = StakingMessage {
            targets,
            amounts,
            params: bridge_payload.to_vec(),
        };
        self.relay.relay(
            &self.reward_token,
            &counterpart,
            transfer_amount,
            &message.encode()?,
        )?;

        let sequence = self.sequence;
        self.sequence += 1;
        tracing::info!(
            chain_id = self.chain_id,
            sequence,
            transfer_amount,
            targets = message.targets.len(),
            "bridge message posted"
        );
        Ok(sequence)
    }

    /// Deliver an inbound message from the remote chain. Only the registered
    /// relayer may call, and the bridge's sender accessor must report the
    /// bound counterpart. Decodes a withheld report and forwards it into the
    /// dispenser's ledger.
    pub fn receive_message(
        &mut self,
        caller: &Address,
        data: &[u8],
        sink: &mut dyn WithheldSink,
    ) -> Result<(), KeelError> {
        if *caller != self.remote_relayer {
            return Err(KeelError::Unauthorized {
                caller: *caller,
                action: "deliver bridge message",
            });
        }
        let counterpart = self.remote_counterpart.ok_or(KeelError::ZeroAddress {
            what: "remote counterpart",
        })?;
        let origin = self.relay.last_message_sender();
        if origin != counterpart {
            return Err(KeelError::Unauthorized {
                caller: origin,
                action: "originate bridge message",
            });
        }

        let report = WithheldReport::decode(data)?;
        tracing::info!(
            chain_id = self.chain_id,
            amount = report.amount,
            "withheld report received"
        );
        sink.sync_withheld_amount(&self.address, self.chain_id, report.amount)
    }
}

impl DepositProcessor for BridgeAdapter {
    fn address(&self) -> Address {
        self.address
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
        let counterpart = self.check_sender(caller)?;
        self.relay_staking(
            vec![*target],
            vec![staking_amount],
            bridge_payload,
            transfer_amount,
            reward_token,
            counterpart,
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
        let counterpart = self.check_sender(caller)?;
        if targets.len() != staking_amounts.len() {
            return Err(KeelError::LengthMismatch {
                left: targets.len(),
                right: staking_amounts.len(),
            });
        }
        self.relay_staking(
            targets.to_vec(),
            staking_amounts.to_vec(),
            bridge_payload,
            transfer_amount,
            reward_token,
            counterpart,
        )
    }
}
