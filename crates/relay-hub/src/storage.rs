//! Storage layout shared by the hub and every proxy.
//!
//! Proxies run hub code in their own storage, so the layout is identical in
//! both. Only the hub's copy is authoritative; proxy-context reads resolve
//! through the hub.

use alloy_primitives::{Address, B256, U256};
use relay_ledger::{CallContext, LedgerError};

/// Cold-storage destination. Zero means the hub is killed.
pub const COLD_ADDRESS_SLOT: U256 = U256::ZERO;

/// Minimum accepted deposit in wei.
pub const MIN_INPUT_SLOT: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Auxiliary logic reached by unknown calls. Zero means unset.
pub const IMPL_ADDRESS_SLOT: U256 = U256::from_limbs([2, 0, 0, 0]);

pub(crate) fn cold_address(ctx: &CallContext<'_>) -> Address {
    word_to_address(ctx.sload(COLD_ADDRESS_SLOT))
}

pub(crate) fn set_cold_address(
    ctx: &mut CallContext<'_>,
    cold: Address,
) -> Result<(), LedgerError> {
    ctx.sstore(COLD_ADDRESS_SLOT, address_to_word(cold))
}

pub(crate) fn min_input(ctx: &CallContext<'_>) -> U256 {
    ctx.sload(MIN_INPUT_SLOT)
}

pub(crate) fn set_min_input(ctx: &mut CallContext<'_>, min: U256) -> Result<(), LedgerError> {
    ctx.sstore(MIN_INPUT_SLOT, min)
}

pub(crate) fn impl_address(ctx: &CallContext<'_>) -> Address {
    word_to_address(ctx.sload(IMPL_ADDRESS_SLOT))
}

pub(crate) fn set_impl_address(
    ctx: &mut CallContext<'_>,
    implementation: Address,
) -> Result<(), LedgerError> {
    ctx.sstore(IMPL_ADDRESS_SLOT, address_to_word(implementation))
}

pub(crate) fn address_to_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

/// Low 20 bytes of a slot, as Solidity reads an `address` variable.
pub(crate) fn word_to_address(word: U256) -> Address {
    Address::from_word(B256::from(word.to_be_bytes::<32>()))
}
