//! Ledger and interpreter failures.

use alloy_primitives::{Address, Bytes, U256};
use thiserror::Error;

/// Failures of ledger-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Sender cannot cover the transferred value.
    #[error("insufficient balance: {address} holds {available}, needs {required}")]
    InsufficientBalance {
        /// Account being debited.
        address: Address,
        /// Balance held.
        available: U256,
        /// Value requested.
        required: U256,
    },
    /// Crediting the account would overflow.
    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),
    /// Nesting exceeded [`MAX_CALL_DEPTH`](crate::MAX_CALL_DEPTH).
    #[error("call depth limit exceeded")]
    CallDepth,
    /// Write attempted inside a static frame.
    #[error("state modification in static context")]
    StaticViolation,
    /// Creation target already holds code or a nonce.
    #[error("contract already exists at {0}")]
    Collision(Address),
    /// Init code reverted or halted.
    #[error("contract creation failed at {address}")]
    CreationFailed {
        /// Address the contract would have been created at.
        address: Address,
        /// Revert data returned by the init code.
        output: Bytes,
    },
}

/// Exceptional halts of the bytecode interpreter.
///
/// Every halt fails the frame with empty revert data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    /// Instruction needed more operands than the stack holds.
    #[error("stack underflow")]
    StackUnderflow,
    /// Stack grew past 1024 items.
    #[error("stack overflow")]
    StackOverflow,
    /// Jump target is not a `JUMPDEST`.
    #[error("invalid jump destination {0}")]
    InvalidJump(usize),
    /// Opcode outside the supported instruction set.
    #[error("unsupported opcode 0x{0:02x}")]
    UnsupportedOpcode(u8),
    /// Memory access beyond the interpreter limit.
    #[error("memory access beyond limit")]
    MemoryLimit,
    /// `RETURNDATACOPY` read past the end of the return buffer.
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,
    /// Write attempted inside a static frame.
    #[error("state modification in static context")]
    StaticViolation,
}
