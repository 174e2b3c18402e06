//! The journaled ledger.

use crate::{
    account::Account,
    error::LedgerError,
    frame::{CallOutcome, Frame, Receipt},
    interpreter::Interpreter,
    journal::{Checkpoint, JournalEntry},
    native::{CallContext, NativeContract, NATIVE_CODE_MARKER},
    MAX_CALL_DEPTH, MAX_NATIVE_DEPTH,
};
use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};
use relay_primitives::create2_address;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

/// In-memory ledger state with per-frame rollback.
///
/// Every frame opens a checkpoint. A failed frame rolls back all changes made
/// since its checkpoint, including those of nested frames that succeeded. The
/// journal is discarded once the outermost checkpoint commits.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<Address, Account>,
    natives: HashMap<Address, Arc<dyn NativeContract>>,
    journal: Vec<JournalEntry>,
    logs: Vec<Log>,
    open_checkpoints: usize,
    native_depth: usize,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // === Reads ===

    /// Returns the account at `address`, if it exists.
    pub fn account(&self, address: Address) -> Option<&Account> {
        self.accounts.get(&address)
    }

    /// Balance of `address`.
    pub fn balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    /// Nonce of `address`.
    pub fn nonce(&self, address: Address) -> u64 {
        self.accounts
            .get(&address)
            .map(|account| account.nonce)
            .unwrap_or_default()
    }

    /// Deployed code of `address`.
    pub fn code(&self, address: Address) -> Bytes {
        self.accounts
            .get(&address)
            .map(|account| account.code.clone())
            .unwrap_or_default()
    }

    /// Deployed code size of `address`.
    pub fn code_size(&self, address: Address) -> usize {
        self.accounts
            .get(&address)
            .map(|account| account.code.len())
            .unwrap_or_default()
    }

    /// Storage slot of `address`.
    pub fn storage(&self, address: Address, slot: U256) -> U256 {
        self.accounts
            .get(&address)
            .map(|account| account.slot(&slot))
            .unwrap_or_default()
    }

    /// Every log emitted by committed transactions, in order.
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Address the next CREATE from `deployer` will use.
    pub fn next_create_address(&self, deployer: Address) -> Address {
        deployer.create(self.nonce(deployer))
    }

    // === Genesis-style setup ===

    /// Credits `amount` to `address` outside of any transaction.
    pub fn fund(&mut self, address: Address, amount: U256) -> Result<(), LedgerError> {
        self.atomically(|ledger| {
            let balance = ledger
                .balance(address)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow(address))?;
            ledger.set_balance(address, balance);
            Ok(())
        })
    }

    /// Places `code` at `address` outside of any transaction.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        self.committed(|ledger| ledger.set_code_journaled(address, code));
    }

    /// Writes a storage slot outside of any transaction.
    pub fn set_storage(&mut self, address: Address, slot: U256, value: U256) {
        self.committed(|ledger| ledger.sstore(address, slot, value));
    }

    // === Transactions ===

    /// Runs `f` under a checkpoint, rolling back every change if it fails.
    pub fn atomically<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if result.is_ok() {
            self.commit(checkpoint);
        } else {
            self.revert(checkpoint);
        }
        result
    }

    /// Executes a transaction from the externally owned account `from`.
    pub fn transact(&mut self, from: Address, to: Address, value: U256, input: Bytes) -> Receipt {
        let logs_start = self.logs.len();
        self.bump_nonce(from);
        self.journal.clear();

        let outcome = self.call(Frame::call(from, to, value, input));
        debug!(
            target: "relay::ledger",
            %from,
            %to,
            %value,
            success = outcome.success,
            "transaction executed"
        );

        Receipt {
            outcome,
            logs: self.logs[logs_start..].to_vec(),
        }
    }

    /// Executes a read-only call; no state can change.
    pub fn view(&mut self, from: Address, to: Address, input: Bytes) -> CallOutcome {
        self.call(Frame::static_call(from, to, input))
    }

    /// Deploys `contract` with CREATE semantics from `deployer`.
    pub fn deploy_native(
        &mut self,
        deployer: Address,
        contract: Arc<dyn NativeContract>,
    ) -> Result<Address, LedgerError> {
        let address = self.next_create_address(deployer);
        if self.is_occupied(address) {
            return Err(LedgerError::Collision(address));
        }

        self.atomically(|ledger| {
            ledger.bump_nonce(deployer);
            ledger.set_nonce(address, 1);
            ledger.set_code_journaled(address, Bytes::from_static(&[NATIVE_CODE_MARKER]));
            ledger.journal.push(JournalEntry::NativeInstalled { address });
            ledger.natives.insert(address, contract);
            Ok::<_, LedgerError>(())
        })?;

        debug!(target: "relay::ledger", %deployer, %address, "native contract deployed");
        Ok(address)
    }

    // === Frame execution ===

    /// Executes `frame`, rolling back its changes if it fails.
    pub(crate) fn call(&mut self, frame: Frame) -> CallOutcome {
        if frame.depth > MAX_CALL_DEPTH {
            debug!(target: "relay::ledger", depth = frame.depth, "call depth exceeded");
            return CallOutcome::revert(Bytes::new());
        }

        let checkpoint = self.checkpoint();

        if frame.transfers_value() {
            let transfer = if frame.is_static {
                Err(LedgerError::StaticViolation)
            } else {
                self.transfer(frame.caller, frame.address, frame.value)
            };
            if let Err(err) = transfer {
                debug!(target: "relay::ledger", %err, "value transfer rejected");
                self.revert(checkpoint);
                return CallOutcome::revert(Bytes::new());
            }
        }

        let outcome = self.execute(&frame);
        if outcome.success {
            self.commit(checkpoint);
        } else {
            self.revert(checkpoint);
        }

        trace!(
            target: "relay::ledger",
            kind = ?frame.kind,
            caller = %frame.caller,
            address = %frame.address,
            code_address = %frame.code_address,
            depth = frame.depth,
            success = outcome.success,
            output_len = outcome.output.len(),
            "frame finished"
        );
        outcome
    }

    fn execute(&mut self, frame: &Frame) -> CallOutcome {
        if let Some(native) = self.natives.get(&frame.code_address).cloned() {
            if self.native_depth >= MAX_NATIVE_DEPTH {
                debug!(
                    target: "relay::ledger",
                    code_address = %frame.code_address,
                    depth = frame.depth,
                    "native frame limit reached"
                );
                return CallOutcome::revert(Bytes::new());
            }

            self.native_depth += 1;
            let result = native.call(&mut CallContext::new(self, frame));
            self.native_depth -= 1;
            return match result {
                Ok(output) => CallOutcome::success(output),
                Err(output) => CallOutcome::revert(output),
            };
        }

        let code = self.code(frame.code_address);
        if code.is_empty() {
            return CallOutcome::success(Bytes::new());
        }
        Interpreter::new(frame, code).run(self)
    }

    /// Deploys `init_code` with CREATE2 from `parent.address`.
    pub(crate) fn create2(
        &mut self,
        parent: &Frame,
        salt: B256,
        init_code: Bytes,
        value: U256,
    ) -> Result<Address, LedgerError> {
        if parent.is_static {
            return Err(LedgerError::StaticViolation);
        }
        let depth = parent.depth + 1;
        if depth > MAX_CALL_DEPTH {
            return Err(LedgerError::CallDepth);
        }

        let creator = parent.address;
        let address = create2_address(creator, salt, keccak256(&init_code));
        if self.is_occupied(address) {
            debug!(target: "relay::ledger", %creator, %address, %salt, "create2 collision");
            return Err(LedgerError::Collision(address));
        }

        self.atomically(|ledger| {
            ledger.bump_nonce(creator);
            ledger.set_nonce(address, 1);
            if !value.is_zero() {
                ledger.transfer(creator, address, value)?;
            }

            let frame = Frame {
                depth,
                ..Frame::call(creator, address, value, Bytes::new())
            };
            let outcome = Interpreter::new(&frame, init_code).run(ledger);
            if !outcome.success {
                return Err(LedgerError::CreationFailed {
                    address,
                    output: outcome.output,
                });
            }

            ledger.set_code_journaled(address, outcome.output);
            Ok(address)
        })
    }

    // === Journaled mutations ===

    pub(crate) fn sstore(&mut self, address: Address, slot: U256, value: U256) {
        let previous = self.touch(address).slot(&slot);
        if previous == value {
            return;
        }
        self.journal.push(JournalEntry::StorageChanged {
            address,
            slot,
            previous,
        });
        Self::write_slot(self.touch(address), slot, value);
    }

    pub(crate) fn push_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    pub(crate) fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), LedgerError> {
        let available = self.balance(from);
        if available < value {
            return Err(LedgerError::InsufficientBalance {
                address: from,
                available,
                required: value,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(value)
            .ok_or(LedgerError::BalanceOverflow(to))?;

        self.set_balance(from, available - value);
        self.set_balance(to, credited);
        Ok(())
    }

    fn set_balance(&mut self, address: Address, balance: U256) {
        let previous = self.touch(address).balance;
        self.journal
            .push(JournalEntry::BalanceChanged { address, previous });
        self.touch(address).balance = balance;
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        let previous = self.touch(address).nonce;
        self.journal
            .push(JournalEntry::NonceChanged { address, previous });
        self.touch(address).nonce = nonce;
    }

    fn bump_nonce(&mut self, address: Address) {
        let next = self.nonce(address).saturating_add(1);
        self.set_nonce(address, next);
    }

    fn set_code_journaled(&mut self, address: Address, code: Bytes) {
        let previous = std::mem::replace(&mut self.touch(address).code, code);
        self.journal
            .push(JournalEntry::CodeChanged { address, previous });
    }

    fn touch(&mut self, address: Address) -> &mut Account {
        if !self.accounts.contains_key(&address) {
            self.journal.push(JournalEntry::AccountCreated { address });
        }
        self.accounts.entry(address).or_default()
    }

    fn is_occupied(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .is_some_and(Account::is_occupied)
    }

    fn write_slot(account: &mut Account, slot: U256, value: U256) {
        if value.is_zero() {
            account.storage.remove(&slot);
        } else {
            account.storage.insert(slot, value);
        }
    }

    // === Checkpoints ===

    /// Applies infallible setup writes under a checkpoint that always commits.
    fn committed(&mut self, f: impl FnOnce(&mut Self)) {
        let checkpoint = self.checkpoint();
        f(self);
        self.commit(checkpoint);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.open_checkpoints += 1;
        Checkpoint {
            journal_len: self.journal.len(),
            logs_len: self.logs.len(),
        }
    }

    fn commit(&mut self, _checkpoint: Checkpoint) {
        self.open_checkpoints -= 1;
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }

    fn revert(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            self.undo(entry);
        }
        self.logs.truncate(checkpoint.logs_len);

        self.open_checkpoints -= 1;
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountCreated { address } => {
                self.accounts.remove(&address);
            }
            JournalEntry::BalanceChanged { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.balance = previous;
                }
            }
            JournalEntry::NonceChanged { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.nonce = previous;
                }
            }
            JournalEntry::CodeChanged { address, previous } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.code = previous;
                }
            }
            JournalEntry::StorageChanged {
                address,
                slot,
                previous,
            } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    Self::write_slot(account, slot, previous);
                }
            }
            JournalEntry::NativeInstalled { address } => {
                self.natives.remove(&address);
            }
        }
    }
}
