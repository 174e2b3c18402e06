use alloy_primitives::{Address, Bytes, U256};

/// Undo record for a single state change.
#[derive(Debug, Clone)]
pub(crate) enum JournalEntry {
    /// Account did not exist before; reverting removes it.
    AccountCreated { address: Address },
    BalanceChanged { address: Address, previous: U256 },
    NonceChanged { address: Address, previous: u64 },
    CodeChanged { address: Address, previous: Bytes },
    StorageChanged { address: Address, slot: U256, previous: U256 },
    /// Native contract registered at a fresh address.
    NativeInstalled { address: Address },
}

/// Journal and log positions to roll back to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pub(crate) journal_len: usize,
    pub(crate) logs_len: usize,
}
