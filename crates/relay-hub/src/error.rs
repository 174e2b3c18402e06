//! Hub failures.

use alloy_primitives::Bytes;
use relay_ledger::LedgerError;
use relay_primitives::RelayError;
use thiserror::Error;

/// Failure of a hub entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// A hub rule rejected the call.
    #[error(transparent)]
    Relay(#[from] RelayError),
    /// A delegated or hub-resolving call reverted; its data is passed through.
    #[error("call reverted with {} bytes of data", .0.len())]
    Reverted(Bytes),
    /// The hub answered a state query with undecodable data.
    #[error("malformed return data from hub")]
    MalformedReturn,
    /// The ledger refused an operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl HubError {
    /// Revert data returned to the caller of the failing frame.
    pub fn into_revert_data(self) -> Bytes {
        match self {
            Self::Relay(err) => err.revert_data(),
            Self::Reverted(data) => data,
            Self::MalformedReturn | Self::Ledger(_) => Bytes::new(),
        }
    }

    /// The relay condition behind this failure, if any.
    pub fn relay_error(&self) -> Option<RelayError> {
        match self {
            Self::Relay(err) => Some(*err),
            Self::Reverted(data) => RelayError::from_revert_data(data),
            Self::MalformedReturn | Self::Ledger(_) => None,
        }
    }
}
