//! Proxy runtime stub and the context detector.
//!
//! Every proxy carries the same 66-byte runtime. The only bytes that differ
//! between instances are the 20 bytes of hub address pushed by the first
//! instruction:
//!
//! ```text
//! 0x00  PUSH20 <hub>
//! 0x15  CALLDATASIZE PUSH1 0x24 JUMPI                        ; payload present -> 0x24
//! 0x19  RETURNDATASIZE x4 CALLVALUE DUP6 GAS CALL            ; relay value, proxy is msg.sender
//! 0x21  PUSH1 0x30 JUMP
//! 0x24  JUMPDEST CALLDATASIZE RETURNDATASIZE RETURNDATASIZE CALLDATACOPY
//! 0x29  RETURNDATASIZE RETURNDATASIZE CALLDATASIZE RETURNDATASIZE DUP5 GAS DELEGATECALL
//! 0x30  JUMPDEST RETURNDATASIZE PUSH1 0 DUP1 RETURNDATACOPY PUSH1 0x3d JUMPI
//! 0x39  RETURNDATASIZE PUSH1 0 REVERT
//! 0x3d  JUMPDEST RETURNDATASIZE PUSH1 0 RETURN
//! ```
//!
//! `RETURNDATASIZE` is used as a one-byte zero only before the first call.

use alloy_primitives::Address;
use revm::bytecode::opcode::{
    CALL, CALLDATACOPY, CALLDATASIZE, CALLVALUE, DELEGATECALL, DUP1, DUP5, DUP6, GAS, JUMP,
    JUMPDEST, JUMPI, PUSH1, PUSH20, RETURN, RETURNDATACOPY, RETURNDATASIZE, REVERT,
};

/// Length of every proxy runtime.
pub const PROXY_RUNTIME_LEN: usize = 66;

/// Byte offset of the embedded hub address inside the runtime.
pub const HUB_ADDRESS_OFFSET: usize = 1;

const HUB_ADDRESS_END: usize = HUB_ADDRESS_OFFSET + 20;

const DELEGATE_PATH: u8 = 0x24;
const RESULT_PATH: u8 = 0x30;
const RETURN_PATH: u8 = 0x3d;

/// Proxy runtime with a zeroed hub address field.
#[rustfmt::skip]
pub const PROXY_RUNTIME_TEMPLATE: [u8; PROXY_RUNTIME_LEN] = [
    PUSH20,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    CALLDATASIZE, PUSH1, DELEGATE_PATH, JUMPI,
    // value relay
    RETURNDATASIZE, RETURNDATASIZE, RETURNDATASIZE, RETURNDATASIZE,
    CALLVALUE, DUP6, GAS, CALL,
    PUSH1, RESULT_PATH, JUMP,
    // delegated execution
    JUMPDEST, CALLDATASIZE, RETURNDATASIZE, RETURNDATASIZE, CALLDATACOPY,
    RETURNDATASIZE, RETURNDATASIZE, CALLDATASIZE, RETURNDATASIZE, DUP5, GAS, DELEGATECALL,
    // bubble result
    JUMPDEST, RETURNDATASIZE, PUSH1, 0x00, DUP1, RETURNDATACOPY, PUSH1, RETURN_PATH, JUMPI,
    RETURNDATASIZE, PUSH1, 0x00, REVERT,
    JUMPDEST, RETURNDATASIZE, PUSH1, 0x00, RETURN,
];

/// Returns the runtime of a proxy relaying to `hub`.
pub fn proxy_runtime(hub: Address) -> [u8; PROXY_RUNTIME_LEN] {
    let mut code = PROXY_RUNTIME_TEMPLATE;
    code[HUB_ADDRESS_OFFSET..HUB_ADDRESS_END].copy_from_slice(hub.as_slice());
    code
}

/// Returns the hub embedded in `code` if `code` is a genuine proxy runtime.
///
/// The length must be exact and every byte outside the address field must
/// match the template. Code that merely resembles the stub, including an
/// equivalent instruction substitution, is not a proxy. A zero embedded
/// address is rejected as well since it cannot name a hub.
pub fn hub_of(code: &[u8]) -> Option<Address> {
    if code.len() != PROXY_RUNTIME_LEN {
        return None;
    }

    if code[..HUB_ADDRESS_OFFSET] != PROXY_RUNTIME_TEMPLATE[..HUB_ADDRESS_OFFSET]
        || code[HUB_ADDRESS_END..] != PROXY_RUNTIME_TEMPLATE[HUB_ADDRESS_END..]
    {
        return None;
    }

    let hub = Address::from_slice(&code[HUB_ADDRESS_OFFSET..HUB_ADDRESS_END]);
    (!hub.is_zero()).then_some(hub)
}

/// Role of the instance whose code is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Executing as the hub itself, or as anything that is not a proxy.
    Hub,
    /// Executing in the storage of a proxy created by `hub`.
    Proxy {
        /// Hub embedded in the proxy runtime.
        hub: Address,
    },
}

impl ExecutionContext {
    /// Classifies the instance owning `code`.
    pub fn of_code(code: &[u8]) -> Self {
        hub_of(code).map_or(Self::Hub, |hub| Self::Proxy { hub })
    }

    /// Returns the embedded hub when running as a proxy.
    pub const fn hub(&self) -> Option<Address> {
        match self {
            Self::Hub => None,
            Self::Proxy { hub } => Some(*hub),
        }
    }

    /// Returns true when running as the hub.
    pub const fn is_hub(&self) -> bool {
        matches!(self, Self::Hub)
    }
}
