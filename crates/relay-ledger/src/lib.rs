//! # Relay ledger
//!
//! A journaled, single-threaded, in-memory model of the host ledger the relay
//! runs on. It provides exactly the execution semantics the relay relies on:
//!
//! - accounts with balance, nonce, code and storage
//! - value calls, delegated calls (caller storage, callee code) and static calls
//! - CREATE-style deployment of native contracts and CREATE2 deployment of
//!   bytecode, with the EIP-684 collision rule
//! - per-frame atomicity: every frame opens a journal checkpoint and a failed
//!   frame rolls back balances, nonces, code, storage and logs
//!
//! Bytecode (the proxy stub and its creation code) runs on a small
//! interpreter. Contracts written in Rust implement [`NativeContract`] and are
//! marked on-ledger by the single byte [`NATIVE_CODE_MARKER`].
//!
//! Gas is not metered; the `GAS` opcode reports a constant.

mod account;
pub mod error;
mod frame;
mod interpreter;
mod journal;
mod ledger;
pub mod native;

pub use account::Account;
pub use error::{InterpreterError, LedgerError};
pub use frame::{CallKind, CallOutcome, Frame, Receipt};
pub use ledger::Ledger;
pub use native::{CallContext, NativeContract, NativeResult, NATIVE_CODE_MARKER};

/// Maximum nesting of call and create frames.
pub const MAX_CALL_DEPTH: usize = 1024;

/// Maximum number of native contract frames open at once.
///
/// Native frames recurse on the host stack, so re-entry through them is
/// bounded well below [`MAX_CALL_DEPTH`].
pub const MAX_NATIVE_DEPTH: usize = 64;
