use alloy_primitives::{Bytes, U256};
use std::collections::HashMap;

/// State of a single ledger account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Native balance in wei.
    pub balance: U256,
    /// Transaction or creation nonce.
    pub nonce: u64,
    /// Deployed runtime code, empty for externally owned accounts.
    pub code: Bytes,
    /// Non-zero storage slots.
    pub storage: HashMap<U256, U256>,
}

impl Account {
    /// Returns true if code is deployed at this account.
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// Returns true if a contract creation targeting this account must fail.
    ///
    /// An account with a balance but no code and no nonce is still creatable,
    /// so value sent to a precomputed address does not block the deployment.
    pub fn is_occupied(&self) -> bool {
        self.nonce != 0 || self.has_code()
    }

    pub(crate) fn slot(&self, slot: &U256) -> U256 {
        self.storage.get(slot).copied().unwrap_or_default()
    }
}
