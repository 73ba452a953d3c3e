// crates/keel-dispenser/src/lock.rs

use keel_core::KeelError;

/// Re-entrancy lock for the claim entry points.
///
/// Acquired after validation at claim entry and released on the single exit
/// path of each claim, whether the claim succeeded or failed.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    locked: bool,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock. Fails if a claim is already in flight.
    pub fn enter(&mut self) -> Result<(), KeelError> {
        if self.locked {
            return Err(KeelError::Reentrancy);
        }
        self.locked = true;
        Ok(())
    }

    /// Release the lock.
    pub fn exit(&mut self) {
        self.locked = false;
    }
}
