//! # Cold-storage relay primitives
//!
//! Shared building blocks for the relay hub and its per-customer proxies.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`stub`] | The 66-byte proxy runtime and the context detector that recognizes it |
//! | [`create2`] | Proxy creation code and content-addressed address derivation |
//! | [`abi`] | Hub and ERC-20 interfaces, the `Deposit` event |
//! | [`error`] | Revert reasons surfaced by the hub |
//!
//! The proxy runtime layout is part of the wire contract: the detector only
//! recognizes instances whose code matches [`stub::PROXY_RUNTIME_TEMPLATE`]
//! byte for byte outside the embedded hub address.

pub mod abi;
pub mod create2;
pub mod error;
pub mod stub;

pub use abi::{IRelayHub, IERC20};
pub use create2::{create2_address, proxy_address, proxy_creation_code, proxy_init_code_hash};
pub use error::{decode_revert_reason, RelayError};
pub use stub::{hub_of, proxy_runtime, ExecutionContext, HUB_ADDRESS_OFFSET, PROXY_RUNTIME_LEN};

use alloy_primitives::U256;

/// Default floor for accepted deposits: 0.001 of the native unit (10^15 wei).
pub const DEFAULT_MIN_INPUT: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);
