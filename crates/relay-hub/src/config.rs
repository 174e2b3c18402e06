//! Deployment parameters of a hub.

use crate::hub::RelayHub;
use alloy_primitives::{Address, U256};
use relay_ledger::Ledger;
use relay_primitives::DEFAULT_MIN_INPUT;
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};
use thiserror::Error;

/// Environment variable holding the cold-storage address.
pub const COLD_ADDRESS_ENV: &str = "RELAY_COLD_ADDRESS";
/// Environment variable holding the admin address.
pub const ADMIN_ADDRESS_ENV: &str = "RELAY_ADMIN_ADDRESS";
/// Optional environment variable overriding the minimum input, in wei.
pub const MIN_INPUT_ENV: &str = "RELAY_MIN_INPUT";

/// Parameters a hub is deployed with.
///
/// ```json
/// {
///   "coldAddress": "0x00000000000000000000000000000000000c01d0",
///   "adminAddress": "0x000000000000000000000000000000000000ad01",
///   "minInput": "0x2386f26fc10000"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfig {
    /// Destination of forwarded deposits.
    pub cold_address: Address,
    /// Administrator, fixed for the lifetime of the hub.
    pub admin_address: Address,
    /// Minimum accepted deposit; [`DEFAULT_MIN_INPUT`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_input: Option<U256>,
}

impl HubConfig {
    /// Creates a configuration with the default minimum input.
    pub const fn new(cold_address: Address, admin_address: Address) -> Self {
        Self {
            cold_address,
            admin_address,
            min_input: None,
        }
    }

    /// Loads the configuration from `RELAY_*` environment variables.
    pub fn from_env() -> eyre::Result<Self> {
        let cold_address = env::var(COLD_ADDRESS_ENV).map(|s| Address::from_str(s.trim()))??;
        let admin_address = env::var(ADMIN_ADDRESS_ENV).map(|s| Address::from_str(s.trim()))??;
        let min_input = env::var(MIN_INPUT_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| U256::from_str(s.trim()))
            .transpose()?;

        let config = Self {
            cold_address,
            admin_address,
            min_input,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Minimum input the hub starts with.
    pub fn effective_min_input(&self) -> U256 {
        self.min_input.unwrap_or(DEFAULT_MIN_INPUT)
    }

    /// Rejects configurations the hub constructor would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cold_address.is_zero() {
            return Err(ConfigError::ZeroColdAddress);
        }
        if self.admin_address.is_zero() {
            return Err(ConfigError::ZeroAdminAddress);
        }
        Ok(())
    }

    /// Deploys a hub from `deployer` with these parameters.
    pub fn deploy(&self, ledger: &mut Ledger, deployer: Address) -> eyre::Result<RelayHub> {
        self.validate()?;
        let hub = RelayHub::deploy_with_min_input(
            ledger,
            deployer,
            self.cold_address,
            self.admin_address,
            self.effective_min_input(),
        )?;
        Ok(hub)
    }
}

/// Invalid hub configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Cold-storage address is zero.
    #[error("cold address must not be zero")]
    ZeroColdAddress,
    /// Admin address is zero.
    #[error("admin address must not be zero")]
    ZeroAdminAddress,
}
