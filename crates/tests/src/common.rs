//! Common test utilities and fixtures for relay tests.
//!
//! Provides a deployed hub on a fresh ledger, plus the contracts the relay
//! interacts with: an ERC-20 style token with configurable `transfer`
//! reporting, an auxiliary logic contract for fallback forwarding, and a sink
//! that refuses value.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, Revert, SolCall, SolError, SolInterface, SolValue};
use eyre::{ensure, eyre, Result};
use relay_hub::RelayHub;
use relay_ledger::{CallContext, CallOutcome, Ledger, NativeContract, NativeResult, Receipt};
use relay_primitives::{IRelayHub, RelayError, IERC20::IERC20Calls};
use std::sync::Arc;

// Test constants
/// Deployer of the hub
pub const DEPLOYER: Address = address!("0x00000000000000000000000000000000000000d1");
/// Hub administrator
pub const ADMIN: Address = address!("0x000000000000000000000000000000000000ad01");
/// Initial cold-storage destination
pub const COLD: Address = address!("0x00000000000000000000000000000000000c01d0");
/// Replacement cold-storage destination
pub const NEW_COLD: Address = address!("0x00000000000000000000000000000000000c01d1");
/// Depositing customer
pub const USER: Address = address!("0x00000000000000000000000000000000000000e1");
/// Deployer of token and logic contracts
pub const CONTRACTS_DEPLOYER: Address = address!("0x00000000000000000000000000000000000000d2");

/// Storage slot written by [`IAuditLogic::recordCall`].
pub const RECORD_SLOT: U256 = U256::from_limbs([7, 0, 0, 0]);
/// Storage slot holding the caller seen by [`IAuditLogic::recordCall`].
pub const RECORD_CALLER_SLOT: U256 = U256::from_limbs([8, 0, 0, 0]);
/// Storage slot holding the value seen by [`IAuditLogic::recordCall`].
pub const RECORD_VALUE_SLOT: U256 = U256::from_limbs([9, 0, 0, 0]);

/// Reason carried by [`IAuditLogic::failCall`].
pub const AUDIT_FAILURE: &str = "audit rejected";

sol! {
    /// Auxiliary logic reached through fallback forwarding.
    interface IAuditLogic {
        /// Returns the executing instance and the admin it reads through it.
        function whoami() external view returns (address instance, address admin);
        /// Stores `value`, the caller and the call value.
        function record(uint256 value) external payable;
        /// Reverts with `Error("audit rejected")`.
        function fail() external;
        /// Reverts without data.
        function failSilently() external;
    }
}

/// Amount of `n` whole native units.
pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10).pow(U256::from(18))
}

/// Salt from a small integer.
pub fn salt(n: u64) -> B256 {
    B256::left_padding_from(&n.to_be_bytes())
}

/// Relay condition carried by a failed receipt.
pub fn reason(receipt: &Receipt) -> Option<RelayError> {
    RelayError::from_revert_data(receipt.output())
}

fn address_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

fn rejected(reason: &str) -> Bytes {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
    .into()
}

/// How [`TestToken`] reports a `transfer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferReporting {
    /// Moves the balance and returns `true`.
    ReturnsTrue,
    /// Moves the balance and returns no data.
    ReturnsNothing,
    /// Leaves balances untouched and returns `false`.
    ReturnsFalse,
    /// Reverts without data.
    Reverts,
}

/// Minimal token keeping each holder's balance in the slot equal to the
/// holder's address.
#[derive(Debug, Clone, Copy)]
pub struct TestToken {
    reporting: TransferReporting,
}

impl TestToken {
    /// Creates a token with the given `transfer` behaviour.
    pub const fn new(reporting: TransferReporting) -> Self {
        Self { reporting }
    }

    /// Credits `amount` to `holder` outside of any transaction.
    pub fn mint(ledger: &mut Ledger, token: Address, holder: Address, amount: U256) {
        let slot = address_word(holder);
        let balance = ledger.storage(token, slot) + amount;
        ledger.set_storage(token, slot, balance);
    }

    /// Balance of `holder`.
    pub fn balance_of(ledger: &Ledger, token: Address, holder: Address) -> U256 {
        ledger.storage(token, address_word(holder))
    }

    fn transfer(&self, ctx: &mut CallContext<'_>, to: Address, amount: U256) -> NativeResult {
        match self.reporting {
            TransferReporting::Reverts => return Err(Bytes::new()),
            TransferReporting::ReturnsFalse => return Ok(false.abi_encode().into()),
            TransferReporting::ReturnsTrue | TransferReporting::ReturnsNothing => {}
        }

        let from = ctx.caller();
        let from_balance = ctx.sload(address_word(from));
        if from_balance < amount {
            return Err(rejected("insufficient token balance"));
        }
        ctx.sstore(address_word(from), from_balance - amount)
            .map_err(|_| Bytes::new())?;
        let to_balance = ctx.sload(address_word(to));
        ctx.sstore(address_word(to), to_balance + amount)
            .map_err(|_| Bytes::new())?;

        if self.reporting == TransferReporting::ReturnsTrue {
            Ok(true.abi_encode().into())
        } else {
            Ok(Bytes::new())
        }
    }
}

impl NativeContract for TestToken {
    fn call(&self, ctx: &mut CallContext<'_>) -> NativeResult {
        match IERC20Calls::abi_decode(ctx.input()).map_err(|_| Bytes::new())? {
            IERC20Calls::balanceOf(call) => {
                Ok(ctx.sload(address_word(call.account)).abi_encode().into())
            }
            IERC20Calls::transfer(call) => self.transfer(ctx, call.to, call.amount),
        }
    }
}

/// Logic contract installed as the hub's implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogic;

impl NativeContract for AuditLogic {
    fn call(&self, ctx: &mut CallContext<'_>) -> NativeResult {
        let call = IAuditLogic::IAuditLogicCalls::abi_decode(ctx.input())
            .map_err(|_| rejected("unknown audit call"))?;
        match call {
            IAuditLogic::IAuditLogicCalls::whoami(_) => {
                let instance = ctx.address();
                let query = IRelayHub::adminCall {}.abi_encode();
                let outcome = ctx.static_call(instance, query.into());
                if !outcome.success {
                    return Err(outcome.output);
                }
                let admin = Address::abi_decode(&outcome.output)
                    .map_err(|_| rejected("bad admin"))?;
                Ok((instance, admin).abi_encode_params().into())
            }
            IAuditLogic::IAuditLogicCalls::record(call) => {
                let (caller, value) = (ctx.caller(), ctx.value());
                ctx.sstore(RECORD_SLOT, call.value).map_err(|_| Bytes::new())?;
                ctx.sstore(RECORD_CALLER_SLOT, address_word(caller))
                    .map_err(|_| Bytes::new())?;
                ctx.sstore(RECORD_VALUE_SLOT, value).map_err(|_| Bytes::new())?;
                Ok(Bytes::new())
            }
            IAuditLogic::IAuditLogicCalls::fail(_) => Err(rejected(AUDIT_FAILURE)),
            IAuditLogic::IAuditLogicCalls::failSilently(_) => Err(Bytes::new()),
        }
    }
}

/// Account that refuses every call, including plain value transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingSink;

impl NativeContract for RejectingSink {
    fn call(&self, _ctx: &mut CallContext<'_>) -> NativeResult {
        Err(Bytes::new())
    }
}

/// A funded user and a hub deployed with [`COLD`] and [`ADMIN`].
#[derive(Debug)]
pub struct Fixture {
    /// Ledger holding every account.
    pub ledger: Ledger,
    /// The hub under test.
    pub hub: RelayHub,
}

impl Fixture {
    /// Deploys the hub and funds [`USER`] with 100 native units.
    pub fn new() -> Result<Self> {
        let mut ledger = Ledger::new();
        ledger.fund(USER, ether(100))?;
        let hub = RelayHub::deploy(&mut ledger, DEPLOYER, COLD, ADMIN)?;
        Ok(Self { ledger, hub })
    }

    /// Address of the hub.
    pub const fn hub_address(&self) -> Address {
        self.hub.address()
    }

    /// Deploys a test contract.
    pub fn deploy_contract(&mut self, contract: impl NativeContract + 'static) -> Result<Address> {
        Ok(self
            .ledger
            .deploy_native(CONTRACTS_DEPLOYER, Arc::new(contract))?)
    }

    /// Sends `call` to `to` from `from`.
    pub fn send(&mut self, from: Address, to: Address, value: U256, call: impl SolCall) -> Receipt {
        self.ledger
            .transact(from, to, value, call.abi_encode().into())
    }

    /// Sends a plain value transfer.
    pub fn deposit(&mut self, from: Address, to: Address, value: U256) -> Receipt {
        self.ledger.transact(from, to, value, Bytes::new())
    }

    /// Read-only call to `to`.
    pub fn view(&mut self, to: Address, call: impl SolCall) -> CallOutcome {
        self.ledger.view(USER, to, call.abi_encode().into())
    }

    /// Reads an address-returning getter of `instance`.
    pub fn view_address(&mut self, instance: Address, call: impl SolCall) -> Result<Address> {
        let outcome = self.view(instance, call);
        ensure!(outcome.is_success(), "view reverted: {:?}", outcome.revert_reason());
        Ok(Address::abi_decode(&outcome.output)?)
    }

    /// Reads a word-returning getter of `instance`.
    pub fn view_u256(&mut self, instance: Address, call: impl SolCall) -> Result<U256> {
        let outcome = self.view(instance, call);
        ensure!(outcome.is_success(), "view reverted: {:?}", outcome.revert_reason());
        Ok(U256::abi_decode(&outcome.output)?)
    }

    /// Deploys the proxy for `salt` from [`USER`].
    pub fn deploy_proxy(&mut self, salt: B256) -> Result<Address> {
        let hub = self.hub_address();
        let receipt = self.send(
            USER,
            hub,
            U256::ZERO,
            IRelayHub::deployNewInstanceCall { salt },
        );
        if !receipt.is_success() {
            return Err(eyre!("proxy deployment reverted: {:?}", reason(&receipt)));
        }
        Ok(Address::abi_decode(receipt.output())?)
    }

    /// Sends an admin call to the hub.
    pub fn admin_call(&mut self, call: impl SolCall) -> Receipt {
        let hub = self.hub_address();
        self.send(ADMIN, hub, U256::ZERO, call)
    }
}
