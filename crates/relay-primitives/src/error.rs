//! Revert reasons surfaced by the hub.

use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};
use thiserror::Error;

/// Failure conditions of hub operations.
///
/// The display string of each variant is the reason carried in the
/// `Error(string)` revert data, so callers can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    /// A required address argument was zero.
    #[error("zero address")]
    ZeroAddress,
    /// Caller is not the admin.
    #[error("not admin")]
    Unauthorized,
    /// Operation reached through a proxy where the hub itself is required.
    #[error("not hub")]
    WrongContext,
    /// The hub is killed.
    #[error("dead")]
    Dead,
    /// Deposit below the minimum input.
    #[error("too small")]
    TooSmall,
    /// Forwarding a deposit to cold storage failed.
    #[error("forward failed")]
    ForwardFailed,
    /// A native or token sweep failed.
    #[error("sweep failed")]
    SweepFailed,
    /// Implementation address has no code.
    #[error("not a contract")]
    NotAContract,
    /// Implementation would delegate back into the hub.
    #[error("circular implementation")]
    CircularImplementation,
    /// Unknown call while no implementation is configured.
    #[error("no implementation")]
    FallbackNotSet,
    /// Implementation reverted without data.
    #[error("fallback failed")]
    FallbackFailed,
    /// Proxy for this salt already exists.
    #[error("salt used")]
    SaltUsed,
    /// Calldata carried a hub selector but did not decode.
    #[error("bad calldata")]
    MalformedCalldata,
}

impl RelayError {
    const ALL: [Self; 13] = [
        Self::ZeroAddress,
        Self::Unauthorized,
        Self::WrongContext,
        Self::Dead,
        Self::TooSmall,
        Self::ForwardFailed,
        Self::SweepFailed,
        Self::NotAContract,
        Self::CircularImplementation,
        Self::FallbackNotSet,
        Self::FallbackFailed,
        Self::SaltUsed,
        Self::MalformedCalldata,
    ];

    /// ABI-encoded `Error(string)` revert data for this condition.
    pub fn revert_data(&self) -> Bytes {
        Revert {
            reason: self.to_string(),
        }
        .abi_encode()
        .into()
    }

    /// Recovers the condition from revert data produced by [`Self::revert_data`].
    pub fn from_revert_data(data: &[u8]) -> Option<Self> {
        let reason = decode_revert_reason(data)?;
        Self::ALL.into_iter().find(|err| err.to_string() == reason)
    }
}

/// Decodes the reason string of `Error(string)` revert data.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}
