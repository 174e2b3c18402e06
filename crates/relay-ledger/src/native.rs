//! Contracts implemented in Rust.
//!
//! A native contract is registered at an address and invoked whenever a frame
//! runs that address's code, including under delegated execution. The
//! [`CallContext`] it receives exposes the frame (who called, whose storage)
//! and the ledger operations a contract can perform from inside that frame.

use crate::{
    error::LedgerError,
    frame::{CallOutcome, Frame},
    ledger::Ledger,
};
use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256};
use std::fmt;

/// Code stored at native contract accounts.
///
/// `0xFE` is the designated invalid instruction, so the account is never empty
/// and never runs as bytecode.
pub const NATIVE_CODE_MARKER: u8 = 0xfe;

/// Return data on success, revert data on failure.
pub type NativeResult = Result<Bytes, Bytes>;

/// A contract whose logic is Rust code.
pub trait NativeContract: fmt::Debug + Send + Sync {
    /// Executes one frame running this contract's code.
    fn call(&self, ctx: &mut CallContext<'_>) -> NativeResult;
}

/// Execution environment of a native contract frame.
#[derive(Debug)]
pub struct CallContext<'a> {
    ledger: &'a mut Ledger,
    frame: &'a Frame,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger, frame: &'a Frame) -> Self {
        Self { ledger, frame }
    }

    /// `msg.sender`.
    pub fn caller(&self) -> Address {
        self.frame.caller
    }

    /// Account whose storage and balance this frame acts on (`address(this)`).
    pub fn address(&self) -> Address {
        self.frame.address
    }

    /// `msg.value`.
    pub fn value(&self) -> U256 {
        self.frame.value
    }

    /// Calldata.
    pub fn input(&self) -> &Bytes {
        &self.frame.input
    }

    /// Deployed code of the executing instance, as `EXTCODECOPY(address(this))`
    /// would return it.
    pub fn own_code(&self) -> Bytes {
        self.ledger.code(self.frame.address)
    }

    /// Deployed code of `address`.
    pub fn code(&self, address: Address) -> Bytes {
        self.ledger.code(address)
    }

    /// Code size of `address`.
    pub fn code_size(&self, address: Address) -> usize {
        self.ledger.code_size(address)
    }

    /// Balance of the executing instance.
    pub fn self_balance(&self) -> U256 {
        self.ledger.balance(self.frame.address)
    }

    /// Reads a slot of the executing instance's storage.
    pub fn sload(&self, slot: U256) -> U256 {
        self.ledger.storage(self.frame.address, slot)
    }

    /// Writes a slot of the executing instance's storage.
    pub fn sstore(&mut self, slot: U256, value: U256) -> Result<(), LedgerError> {
        if self.frame.is_static {
            return Err(LedgerError::StaticViolation);
        }
        self.ledger.sstore(self.frame.address, slot, value);
        Ok(())
    }

    /// Emits a log from the executing instance.
    pub fn emit(&mut self, data: LogData) -> Result<(), LedgerError> {
        if self.frame.is_static {
            return Err(LedgerError::StaticViolation);
        }
        self.ledger.push_log(Log {
            address: self.frame.address,
            data,
        });
        Ok(())
    }

    /// Calls `to` with `value`; the executing instance is the caller.
    pub fn call(&mut self, to: Address, value: U256, input: Bytes) -> CallOutcome {
        if self.frame.is_static && !value.is_zero() {
            return CallOutcome::revert(Bytes::new());
        }
        let child = self.frame.child_call(to, value, input);
        self.ledger.call(child)
    }

    /// Runs `code_address`'s code in this frame's storage, caller and value.
    pub fn delegate_call(&mut self, code_address: Address, input: Bytes) -> CallOutcome {
        let child = self.frame.child_delegate_call(code_address, input);
        self.ledger.call(child)
    }

    /// Read-only call to `to`.
    pub fn static_call(&mut self, to: Address, input: Bytes) -> CallOutcome {
        let child = self.frame.child_static_call(to, input);
        self.ledger.call(child)
    }

    /// Deploys `init_code` with CREATE2 from the executing instance.
    pub fn create2(&mut self, salt: B256, init_code: Bytes) -> Result<Address, LedgerError> {
        self.ledger.create2(self.frame, salt, init_code, U256::ZERO)
    }
}
