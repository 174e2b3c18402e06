//! Call frames and their outcomes.

use alloy_primitives::{Address, Bytes, Log, U256};
use relay_primitives::decode_revert_reason;

/// How a frame was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Regular call, optionally transferring value.
    Call,
    /// Callee code executed in the caller's storage, balance and identity.
    DelegateCall,
    /// Read-only call.
    StaticCall,
}

/// Inputs of a single execution frame.
///
/// `address` is the account whose storage and balance the frame acts on;
/// `code_address` is the account whose code runs. They differ only for
/// delegated execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// How the frame was entered.
    pub kind: CallKind,
    /// `msg.sender` as seen by the executing code.
    pub caller: Address,
    /// Storage and balance context.
    pub address: Address,
    /// Account whose code runs.
    pub code_address: Address,
    /// `msg.value`; carried over unchanged by delegated calls.
    pub value: U256,
    /// Calldata.
    pub input: Bytes,
    /// Writes are forbidden in this frame and all frames below it.
    pub is_static: bool,
    /// Nesting depth, zero for the transaction frame.
    pub depth: usize,
}

impl Frame {
    /// Transaction-level call from `caller` to `to`.
    pub fn call(caller: Address, to: Address, value: U256, input: Bytes) -> Self {
        Self {
            kind: CallKind::Call,
            caller,
            address: to,
            code_address: to,
            value,
            input,
            is_static: false,
            depth: 0,
        }
    }

    /// Transaction-level read-only call.
    pub fn static_call(caller: Address, to: Address, input: Bytes) -> Self {
        Self {
            kind: CallKind::StaticCall,
            is_static: true,
            ..Self::call(caller, to, U256::ZERO, input)
        }
    }

    /// Call issued by this frame's code.
    pub fn child_call(&self, to: Address, value: U256, input: Bytes) -> Self {
        Self {
            kind: CallKind::Call,
            caller: self.address,
            address: to,
            code_address: to,
            value,
            input,
            is_static: self.is_static,
            depth: self.depth + 1,
        }
    }

    /// Delegated call issued by this frame's code: `code_address` runs with
    /// this frame's storage, caller and value.
    pub fn child_delegate_call(&self, code_address: Address, input: Bytes) -> Self {
        Self {
            kind: CallKind::DelegateCall,
            caller: self.caller,
            address: self.address,
            code_address,
            value: self.value,
            input,
            is_static: self.is_static,
            depth: self.depth + 1,
        }
    }

    /// Read-only call issued by this frame's code.
    pub fn child_static_call(&self, to: Address, input: Bytes) -> Self {
        Self {
            kind: CallKind::StaticCall,
            caller: self.address,
            address: to,
            code_address: to,
            value: U256::ZERO,
            input,
            is_static: true,
            depth: self.depth + 1,
        }
    }

    /// Returns true if entering the frame moves value from caller to callee.
    pub fn transfers_value(&self) -> bool {
        self.kind == CallKind::Call && !self.value.is_zero()
    }
}

/// Result of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// False if the frame reverted or halted; its state changes are rolled back.
    pub success: bool,
    /// Return data, or revert data on failure.
    pub output: Bytes,
}

impl CallOutcome {
    /// Successful outcome returning `output`.
    pub fn success(output: Bytes) -> Self {
        Self {
            success: true,
            output,
        }
    }

    /// Failed outcome carrying revert data.
    pub fn revert(output: Bytes) -> Self {
        Self {
            success: false,
            output,
        }
    }

    /// Returns true if the frame succeeded.
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Reason string of a failed outcome, if it carries `Error(string)` data.
    pub fn revert_reason(&self) -> Option<String> {
        if self.success {
            return None;
        }
        decode_revert_reason(&self.output)
    }
}

/// Result of a transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Outcome of the transaction frame.
    pub outcome: CallOutcome,
    /// Logs emitted by the transaction, empty if it failed.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Returns true if the transaction succeeded.
    pub const fn is_success(&self) -> bool {
        self.outcome.success
    }

    /// Return or revert data of the transaction frame.
    pub const fn output(&self) -> &Bytes {
        &self.outcome.output
    }

    /// Reason string of a failed transaction.
    pub fn revert_reason(&self) -> Option<String> {
        self.outcome.revert_reason()
    }
}
