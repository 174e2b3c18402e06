//! Deterministic proxy deployment.

use crate::{error::HubError, hub::RelayHub};
use alloy_primitives::{Address, B256};
use relay_ledger::{CallContext, LedgerError};
use relay_primitives::{proxy_address, proxy_creation_code, RelayError};
use tracing::{info, instrument, warn};

impl RelayHub {
    /// Creates the proxy for `salt` with CREATE2. Each salt works once.
    #[instrument(target = "relay::hub", skip(self, ctx), fields(
        caller = %ctx.caller(),
        proxy = tracing::field::Empty,
    ))]
    pub(crate) fn deploy_new_instance(
        &self,
        ctx: &mut CallContext<'_>,
        salt: B256,
    ) -> Result<Address, HubError> {
        self.only_hub_context(ctx)?;

        let proxy = match ctx.create2(salt, proxy_creation_code(self.address())) {
            Ok(proxy) => proxy,
            Err(LedgerError::Collision(existing)) => {
                warn!(target: "relay::hub", %existing, "salt already used");
                return Err(RelayError::SaltUsed.into());
            }
            Err(err) => return Err(err.into()),
        };

        tracing::Span::current().record("proxy", tracing::field::display(proxy));
        info!(target: "relay::hub", %proxy, "proxy deployed");
        Ok(proxy)
    }

    /// Address [`deploy_new_instance`](Self::deploy_new_instance) creates the
    /// proxy for `salt` at.
    pub fn compute_address(&self, salt: B256) -> Address {
        proxy_address(self.address(), salt)
    }
}
