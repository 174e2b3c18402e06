//! The hub contract.

use crate::{
    error::HubError,
    storage::{self, address_to_word, COLD_ADDRESS_SLOT, MIN_INPUT_SLOT},
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface, SolValue};
use relay_ledger::{CallContext, Ledger, NativeContract, NativeResult};
use relay_primitives::{
    IRelayHub::{self, IRelayHubCalls},
    ExecutionContext, RelayError, DEFAULT_MIN_INPUT,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hub of a relay group.
///
/// `admin` and `self_address` are part of the hub's code: a proxy delegating
/// to the hub sees the same values, while the mutable state in
/// [`storage`](crate::storage) belongs to whichever instance is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayHub {
    admin: Address,
    self_address: Address,
}

impl RelayHub {
    /// Deploys a hub from `deployer` with the default minimum input.
    ///
    /// Fails with [`RelayError::ZeroAddress`] before touching the ledger if
    /// either address is zero.
    pub fn deploy(
        ledger: &mut Ledger,
        deployer: Address,
        cold: Address,
        admin: Address,
    ) -> Result<Self, HubError> {
        Self::deploy_with_min_input(ledger, deployer, cold, admin, DEFAULT_MIN_INPUT)
    }

    pub(crate) fn deploy_with_min_input(
        ledger: &mut Ledger,
        deployer: Address,
        cold: Address,
        admin: Address,
        min_input: U256,
    ) -> Result<Self, HubError> {
        if cold.is_zero() || admin.is_zero() {
            return Err(RelayError::ZeroAddress.into());
        }

        let hub = Self {
            admin,
            self_address: ledger.next_create_address(deployer),
        };
        ledger.atomically(|ledger| -> Result<(), HubError> {
            let address = ledger.deploy_native(deployer, Arc::new(hub))?;
            ledger.set_storage(address, COLD_ADDRESS_SLOT, address_to_word(cold));
            ledger.set_storage(address, MIN_INPUT_SLOT, min_input);
            Ok(())
        })?;

        info!(
            target: "relay::hub",
            hub = %hub.self_address,
            %admin,
            %cold,
            %min_input,
            "hub deployed"
        );
        Ok(hub)
    }

    /// Administrator fixed at construction.
    pub const fn admin(&self) -> Address {
        self.admin
    }

    /// Address the hub is deployed at.
    pub const fn address(&self) -> Address {
        self.self_address
    }

    /// Classifies the executing instance from its own code.
    pub(crate) fn context(&self, ctx: &CallContext<'_>) -> ExecutionContext {
        ExecutionContext::of_code(&ctx.own_code())
    }

    fn dispatch(&self, ctx: &mut CallContext<'_>) -> Result<Bytes, HubError> {
        let input = ctx.input().clone();
        if input.is_empty() {
            self.receive_value(ctx)?;
            return Ok(Bytes::new());
        }

        let is_hub_selector = input
            .get(..4)
            .and_then(|selector| <[u8; 4]>::try_from(selector).ok())
            .is_some_and(|selector| IRelayHubCalls::SELECTORS.contains(&selector));
        if !is_hub_selector {
            return self.forward_call(ctx, input);
        }

        let call =
            IRelayHubCalls::abi_decode(&input).map_err(|_| RelayError::MalformedCalldata)?;
        match call {
            IRelayHubCalls::changeColdAddress(call) => {
                self.change_cold_address(ctx, call.newCold)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::changeImplAddress(call) => {
                self.change_impl_address(ctx, call.newImpl)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::changeMinInput(call) => {
                self.change_min_input(ctx, call.newMin)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::kill(_) => {
                self.kill(ctx)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::sweep(_) => {
                self.sweep_native(ctx)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::sweepToken(call) => {
                self.sweep_token(ctx, call.token)?;
                Ok(Bytes::new())
            }
            IRelayHubCalls::deployNewInstance(call) => {
                let proxy = self.deploy_new_instance(ctx, call.salt)?;
                Ok(proxy.abi_encode().into())
            }
            IRelayHubCalls::detectContext(_) => {
                let hub = self.context(ctx).hub().unwrap_or_default();
                Ok(hub.abi_encode().into())
            }
            IRelayHubCalls::coldAddress(_) => Ok(self.resolve_cold(ctx)?.abi_encode().into()),
            IRelayHubCalls::minInput(_) => Ok(self.resolve_min_input(ctx)?.abi_encode().into()),
            IRelayHubCalls::implAddress(_) => Ok(self.resolve_impl(ctx)?.abi_encode().into()),
            IRelayHubCalls::admin(_) => Ok(self.admin.abi_encode().into()),
            IRelayHubCalls::computeAddress(call) => {
                Ok(self.compute_address(call.salt).abi_encode().into())
            }
        }
    }

    // === Guards ===

    /// Rejects calls reached through a proxy.
    pub(crate) fn only_hub_context(&self, ctx: &CallContext<'_>) -> Result<(), HubError> {
        if let ExecutionContext::Proxy { hub } = self.context(ctx) {
            debug!(
                target: "relay::hub",
                proxy = %ctx.address(),
                %hub,
                "hub-only call reached through proxy"
            );
            return Err(RelayError::WrongContext.into());
        }
        Ok(())
    }

    /// Rejects calls while killed and returns the live cold address.
    pub(crate) fn only_alive(&self, ctx: &mut CallContext<'_>) -> Result<Address, HubError> {
        let cold = self.resolve_cold(ctx)?;
        if cold.is_zero() {
            debug!(target: "relay::hub", instance = %ctx.address(), "hub is dead");
            return Err(RelayError::Dead.into());
        }
        Ok(cold)
    }

    fn only_admin(&self, ctx: &CallContext<'_>) -> Result<(), HubError> {
        if ctx.caller() != self.admin {
            warn!(target: "relay::hub", caller = %ctx.caller(), "unauthorized admin call");
            return Err(RelayError::Unauthorized.into());
        }
        Ok(())
    }

    // === Admin mutators ===

    /// Allowed while killed; a non-zero address revives the hub.
    fn change_cold_address(
        &self,
        ctx: &mut CallContext<'_>,
        cold: Address,
    ) -> Result<(), HubError> {
        self.only_hub_context(ctx)?;
        self.only_admin(ctx)?;
        if cold.is_zero() {
            return Err(RelayError::ZeroAddress.into());
        }

        let previous = storage::cold_address(ctx);
        storage::set_cold_address(ctx, cold)?;
        if previous.is_zero() {
            info!(target: "relay::hub", %cold, "hub revived");
        } else {
            info!(target: "relay::hub", %previous, %cold, "cold address changed");
        }
        Ok(())
    }

    fn change_impl_address(
        &self,
        ctx: &mut CallContext<'_>,
        implementation: Address,
    ) -> Result<(), HubError> {
        self.only_hub_context(ctx)?;
        self.only_alive(ctx)?;
        self.only_admin(ctx)?;
        if !implementation.is_zero() && ctx.code_size(implementation) == 0 {
            return Err(RelayError::NotAContract.into());
        }
        if self.delegates_back(ctx, implementation) {
            warn!(target: "relay::hub", %implementation, "implementation would re-enter the hub");
            return Err(RelayError::CircularImplementation.into());
        }

        storage::set_impl_address(ctx, implementation)?;
        info!(target: "relay::hub", %implementation, "implementation changed");
        Ok(())
    }

    /// Whether delegating to `implementation` would run this hub's code again.
    fn delegates_back(&self, ctx: &CallContext<'_>, implementation: Address) -> bool {
        if implementation == self.self_address {
            return true;
        }
        ExecutionContext::of_code(&ctx.code(implementation)).hub() == Some(self.self_address)
    }

    fn change_min_input(&self, ctx: &mut CallContext<'_>, min: U256) -> Result<(), HubError> {
        self.only_hub_context(ctx)?;
        self.only_alive(ctx)?;
        self.only_admin(ctx)?;

        storage::set_min_input(ctx, min)?;
        info!(target: "relay::hub", %min, "minimum input changed");
        Ok(())
    }

    fn kill(&self, ctx: &mut CallContext<'_>) -> Result<(), HubError> {
        self.only_hub_context(ctx)?;
        self.only_alive(ctx)?;
        self.only_admin(ctx)?;

        storage::set_cold_address(ctx, Address::ZERO)?;
        info!(target: "relay::hub", hub = %ctx.address(), "hub killed");
        Ok(())
    }

    // === State resolution ===

    /// Cold address of the hub; zero when killed.
    pub(crate) fn resolve_cold(&self, ctx: &mut CallContext<'_>) -> Result<Address, HubError> {
        if self.context(ctx).is_hub() {
            return Ok(storage::cold_address(ctx));
        }
        let output = self.query_hub(ctx, IRelayHub::coldAddressCall {}.abi_encode())?;
        Address::abi_decode(&output).map_err(|_| HubError::MalformedReturn)
    }

    pub(crate) fn resolve_min_input(&self, ctx: &mut CallContext<'_>) -> Result<U256, HubError> {
        if self.context(ctx).is_hub() {
            return Ok(storage::min_input(ctx));
        }
        let output = self.query_hub(ctx, IRelayHub::minInputCall {}.abi_encode())?;
        U256::abi_decode(&output).map_err(|_| HubError::MalformedReturn)
    }

    pub(crate) fn resolve_impl(&self, ctx: &mut CallContext<'_>) -> Result<Address, HubError> {
        if self.context(ctx).is_hub() {
            return Ok(storage::impl_address(ctx));
        }
        let output = self.query_hub(ctx, IRelayHub::implAddressCall {}.abi_encode())?;
        Address::abi_decode(&output).map_err(|_| HubError::MalformedReturn)
    }

    /// Read-only call to a getter of the hub itself.
    fn query_hub(&self, ctx: &mut CallContext<'_>, input: Vec<u8>) -> Result<Bytes, HubError> {
        let outcome = ctx.static_call(self.self_address, input.into());
        if !outcome.success {
            return Err(HubError::Reverted(outcome.output));
        }
        debug!(target: "relay::hub", proxy = %ctx.address(), "state resolved through hub");
        Ok(outcome.output)
    }

    /// Funds leaving an instance go to cold storage, or to the admin once
    /// the hub is killed.
    pub(crate) fn send_target(&self, ctx: &mut CallContext<'_>) -> Result<Address, HubError> {
        let cold = self.resolve_cold(ctx)?;
        Ok(if cold.is_zero() { self.admin } else { cold })
    }
}

impl NativeContract for RelayHub {
    fn call(&self, ctx: &mut CallContext<'_>) -> NativeResult {
        self.dispatch(ctx).map_err(HubError::into_revert_data)
    }
}
