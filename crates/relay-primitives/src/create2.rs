//! Proxy creation code and deterministic address derivation.
//!
//! A proxy is created with `CREATION_PREFIX ++ proxy_runtime(hub)`. The prefix
//! copies the runtime that follows it into memory and returns it:
//!
//! ```text
//! PUSH1 0x42 DUP1 PUSH1 0x09 RETURNDATASIZE CODECOPY RETURNDATASIZE RETURN
//! ```
//!
//! The resulting address is the standard CREATE2 derivation:
//!
//! ```text
//! keccak256(0xff ++ hub ++ salt ++ keccak256(creation_code))[12..]
//! ```
//!
//! Since the creation code embeds the hub, a salt maps to a single address per
//! hub and the ledger's collision rule makes every salt single-use.

use crate::stub::{proxy_runtime, PROXY_RUNTIME_LEN};
use alloy_primitives::{keccak256, Address, Bytes, B256};
use revm::bytecode::opcode::{CODECOPY, DUP1, PUSH1, RETURN, RETURNDATASIZE};

/// Length of the creation prefix placed before the runtime.
pub const CREATION_PREFIX_LEN: usize = 9;

/// Init code prefix returning the runtime appended after it.
#[rustfmt::skip]
pub const CREATION_PREFIX: [u8; CREATION_PREFIX_LEN] = [
    PUSH1, PROXY_RUNTIME_LEN as u8, DUP1,
    PUSH1, CREATION_PREFIX_LEN as u8, RETURNDATASIZE, CODECOPY,
    RETURNDATASIZE, RETURN,
];

/// Marker byte prepended to CREATE2 preimages.
const CREATE2_MARKER: u8 = 0xff;

/// Full creation code of a proxy relaying to `hub`.
pub fn proxy_creation_code(hub: Address) -> Bytes {
    let mut code = Vec::with_capacity(CREATION_PREFIX_LEN + PROXY_RUNTIME_LEN);
    code.extend_from_slice(&CREATION_PREFIX);
    code.extend_from_slice(&proxy_runtime(hub));
    code.into()
}

/// Hash of the creation code of a proxy relaying to `hub`.
pub fn proxy_init_code_hash(hub: Address) -> B256 {
    keccak256(proxy_creation_code(hub))
}

/// Address produced by CREATE2 from `deployer` with `salt` and `init_code_hash`.
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut preimage = [0u8; 85];
    preimage[0] = CREATE2_MARKER;
    preimage[1..21].copy_from_slice(deployer.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..85].copy_from_slice(init_code_hash.as_slice());

    Address::from_slice(&keccak256(preimage)[12..])
}

/// Address the hub will deploy (or has deployed) the proxy for `salt` at.
pub fn proxy_address(hub: Address, salt: B256) -> Address {
    create2_address(hub, salt, proxy_init_code_hash(hub))
}
