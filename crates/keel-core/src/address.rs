// crates/keel-core/src/address.rs
//
// Component and account addresses.
//
// Every protocol component instance, token contract, and user account is
// identified by a 32-byte address. The all-zero address is never a valid
// actor and doubles as the "unset" sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte account or component address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address. Never a valid actor.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Whether this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
