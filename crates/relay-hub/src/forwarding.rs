//! Value and token forwarding.

use crate::{error::HubError, hub::RelayHub, storage};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use relay_ledger::CallContext;
use relay_primitives::{IRelayHub, RelayError, IERC20};
use tracing::{debug, info, warn};

impl RelayHub {
    /// Accepts a plain value transfer and forwards it to cold storage.
    ///
    /// Proxies relay deposits with a regular call, so this always runs in the
    /// hub's own storage and reads it directly.
    pub(crate) fn receive_value(&self, ctx: &mut CallContext<'_>) -> Result<(), HubError> {
        let cold = storage::cold_address(ctx);
        if cold.is_zero() {
            return Err(RelayError::Dead.into());
        }
        let amount = ctx.value();
        if amount < storage::min_input(ctx) {
            debug!(target: "relay::hub", sender = %ctx.caller(), %amount, "deposit below minimum");
            return Err(RelayError::TooSmall.into());
        }

        let outcome = ctx.call(cold, amount, Bytes::new());
        if !outcome.success {
            warn!(target: "relay::hub", %cold, %amount, "forwarding to cold storage failed");
            return Err(RelayError::ForwardFailed.into());
        }

        let receiver = ctx.caller();
        ctx.emit(IRelayHub::Deposit { receiver, amount }.encode_log_data())?;
        info!(target: "relay::hub", %receiver, %amount, %cold, "deposit forwarded");
        Ok(())
    }

    /// Sends the executing instance's whole native balance out.
    pub(crate) fn sweep_native(&self, ctx: &mut CallContext<'_>) -> Result<(), HubError> {
        let balance = ctx.self_balance();
        if balance.is_zero() {
            return Ok(());
        }

        let target = self.send_target(ctx)?;
        let outcome = ctx.call(target, balance, Bytes::new());
        if !outcome.success {
            warn!(target: "relay::hub", instance = %ctx.address(), %target, "native sweep failed");
            return Err(RelayError::SweepFailed.into());
        }

        info!(
            target: "relay::hub",
            instance = %ctx.address(),
            %target,
            %balance,
            "native balance swept"
        );
        Ok(())
    }

    /// Sends the executing instance's whole `token` balance out.
    ///
    /// Tokens that return nothing from `transfer` are accepted; a returned
    /// `false` fails the sweep.
    pub(crate) fn sweep_token(
        &self,
        ctx: &mut CallContext<'_>,
        token: Address,
    ) -> Result<(), HubError> {
        let instance = ctx.address();
        let query = IERC20::balanceOfCall { account: instance }.abi_encode();
        let outcome = ctx.static_call(token, query.into());
        if !outcome.success {
            warn!(target: "relay::hub", %token, "token balance query failed");
            return Err(RelayError::SweepFailed.into());
        }
        let balance = U256::abi_decode(&outcome.output).map_err(|_| RelayError::SweepFailed)?;
        if balance.is_zero() {
            return Ok(());
        }

        let target = self.send_target(ctx)?;
        let transfer = IERC20::transferCall {
            to: target,
            amount: balance,
        }
        .abi_encode();
        let outcome = ctx.call(token, U256::ZERO, transfer.into());
        let reported =
            outcome.output.is_empty() || bool::abi_decode(&outcome.output).unwrap_or(false);
        if !outcome.success || !reported {
            warn!(
                target: "relay::hub",
                %instance,
                %token,
                %target,
                reverted = !outcome.success,
                "token sweep failed"
            );
            return Err(RelayError::SweepFailed.into());
        }

        info!(target: "relay::hub", %instance, %token, %target, %balance, "token balance swept");
        Ok(())
    }

    /// Delegates a call the hub does not implement to the implementation.
    ///
    /// Caller, value and payload are preserved. Return data and revert data
    /// pass through unchanged, except that an empty revert is reported as
    /// [`RelayError::FallbackFailed`].
    pub(crate) fn forward_call(
        &self,
        ctx: &mut CallContext<'_>,
        input: Bytes,
    ) -> Result<Bytes, HubError> {
        self.only_alive(ctx)?;
        let implementation = self.resolve_impl(ctx)?;
        if implementation.is_zero() {
            return Err(RelayError::FallbackNotSet.into());
        }

        debug!(
            target: "relay::hub",
            instance = %ctx.address(),
            %implementation,
            input_len = input.len(),
            "forwarding to implementation"
        );
        let outcome = ctx.delegate_call(implementation, input);
        if outcome.success {
            return Ok(outcome.output);
        }
        if outcome.output.is_empty() {
            return Err(RelayError::FallbackFailed.into());
        }
        Err(HubError::Reverted(outcome.output))
    }
}
