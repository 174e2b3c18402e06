//! # Relay hub
//!
//! The hub contract of a cold-storage relay group, implemented as a
//! [`NativeContract`](relay_ledger::NativeContract). The same code answers
//! calls made to the hub directly and calls delegated to it by any of its
//! proxies; every entry point first establishes which of the two it is
//! running as.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`hub`] | construction, dispatch, guards, admin mutators and getters |
//! | `forwarding` | deposits, native and token sweeps, fallback delegation |
//! | `deployer` | CREATE2 deployment and prediction of proxies |
//! | [`config`] | deployment parameters loaded from JSON or the environment |
//! | [`error`] | hub failures and their revert data |

pub mod config;
mod deployer;
pub mod error;
mod forwarding;
pub mod hub;
mod storage;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigError, HubConfig};
pub use error::HubError;
pub use hub::RelayHub;
pub use storage::{COLD_ADDRESS_SLOT, IMPL_ADDRESS_SLOT, MIN_INPUT_SLOT};
