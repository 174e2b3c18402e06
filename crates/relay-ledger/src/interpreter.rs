//! Bytecode interpreter for the instructions proxy stubs and their creation
//! code use.

use crate::{
    error::InterpreterError,
    frame::{CallOutcome, Frame},
    ledger::Ledger,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use revm::bytecode::opcode::*;
use std::ops::Range;
use tracing::debug;

const STACK_LIMIT: usize = 1024;
const MEMORY_LIMIT: usize = 1 << 20;

/// Value reported by `GAS`; gas is not metered.
const GAS_REMAINING: u64 = 30_000_000;

#[derive(Debug)]
enum Halt {
    Stop,
    Return(Bytes),
    Revert(Bytes),
}

#[derive(Debug)]
pub(crate) struct Interpreter<'a> {
    frame: &'a Frame,
    code: Bytes,
    jumpdests: Vec<bool>,
    pc: usize,
    stack: Vec<U256>,
    memory: Vec<u8>,
    return_data: Bytes,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(frame: &'a Frame, code: Bytes) -> Self {
        let jumpdests = analyze_jumpdests(&code);
        Self {
            frame,
            code,
            jumpdests,
            pc: 0,
            stack: Vec::new(),
            memory: Vec::new(),
            return_data: Bytes::new(),
        }
    }

    /// Runs the code to completion. Exceptional halts revert with empty data.
    pub(crate) fn run(mut self, ledger: &mut Ledger) -> CallOutcome {
        match self.execute(ledger) {
            Ok(Halt::Stop) => CallOutcome::success(Bytes::new()),
            Ok(Halt::Return(output)) => CallOutcome::success(output),
            Ok(Halt::Revert(output)) => CallOutcome::revert(output),
            Err(err) => {
                debug!(
                    target: "relay::interpreter",
                    %err,
                    pc = self.pc,
                    address = %self.frame.address,
                    "exceptional halt"
                );
                CallOutcome::revert(Bytes::new())
            }
        }
    }

    fn execute(&mut self, ledger: &mut Ledger) -> Result<Halt, InterpreterError> {
        while let Some(&opcode) = self.code.get(self.pc) {
            self.pc += 1;
            match opcode {
                STOP => return Ok(Halt::Stop),
                ADD => self.binary(|a, b| a.wrapping_add(b))?,
                SUB => self.binary(|a, b| a.wrapping_sub(b))?,
                LT => self.binary(|a, b| flag(a < b))?,
                GT => self.binary(|a, b| flag(a > b))?,
                EQ => self.binary(|a, b| flag(a == b))?,
                AND => self.binary(|a, b| a & b)?,
                OR => self.binary(|a, b| a | b)?,
                ISZERO => {
                    let a = self.pop()?;
                    self.push(flag(a.is_zero()))?;
                }
                NOT => {
                    let a = self.pop()?;
                    self.push(!a)?;
                }
                ADDRESS => self.push(address_word(self.frame.address))?,
                CALLER => self.push(address_word(self.frame.caller))?,
                CALLVALUE => self.push(self.frame.value)?,
                SELFBALANCE => self.push(ledger.balance(self.frame.address))?,
                CALLDATALOAD => {
                    let offset = self.pop()?;
                    let mut word = [0u8; 32];
                    copy_padded(&mut word, &self.frame.input, offset);
                    self.push(U256::from_be_bytes(word))?;
                }
                CALLDATASIZE => self.push(U256::from(self.frame.input.len()))?,
                CALLDATACOPY => {
                    let (dest, offset, size) = (self.pop()?, self.pop()?, self.pop()?);
                    let range = self.memory_range(dest, size)?;
                    copy_padded(&mut self.memory[range], &self.frame.input, offset);
                }
                CODESIZE => self.push(U256::from(self.code.len()))?,
                CODECOPY => {
                    let (dest, offset, size) = (self.pop()?, self.pop()?, self.pop()?);
                    let range = self.memory_range(dest, size)?;
                    copy_padded(&mut self.memory[range], &self.code, offset);
                }
                RETURNDATASIZE => self.push(U256::from(self.return_data.len()))?,
                RETURNDATACOPY => {
                    let (dest, offset, size) = (self.pop()?, self.pop()?, self.pop()?);
                    let end = offset
                        .checked_add(size)
                        .filter(|end| *end <= U256::from(self.return_data.len()))
                        .ok_or(InterpreterError::ReturnDataOutOfBounds)?;
                    let start = end.as_limbs()[0] as usize - size.as_limbs()[0] as usize;
                    let range = self.memory_range(dest, size)?;
                    let len = range.len();
                    self.memory[range].copy_from_slice(&self.return_data[start..start + len]);
                }
                POP => {
                    self.pop()?;
                }
                MLOAD => {
                    let offset = self.pop()?;
                    let range = self.memory_range(offset, U256::from(32))?;
                    let word = U256::from_be_slice(&self.memory[range]);
                    self.push(word)?;
                }
                MSTORE => {
                    let (offset, value) = (self.pop()?, self.pop()?);
                    let range = self.memory_range(offset, U256::from(32))?;
                    self.memory[range].copy_from_slice(&value.to_be_bytes::<32>());
                }
                SLOAD => {
                    let slot = self.pop()?;
                    self.push(ledger.storage(self.frame.address, slot))?;
                }
                SSTORE => {
                    if self.frame.is_static {
                        return Err(InterpreterError::StaticViolation);
                    }
                    let (slot, value) = (self.pop()?, self.pop()?);
                    ledger.sstore(self.frame.address, slot, value);
                }
                JUMP => {
                    let dest = self.pop()?;
                    self.jump(dest)?;
                }
                JUMPI => {
                    let (dest, condition) = (self.pop()?, self.pop()?);
                    if !condition.is_zero() {
                        self.jump(dest)?;
                    }
                }
                PC => self.push(U256::from(self.pc - 1))?,
                GAS => self.push(U256::from(GAS_REMAINING))?,
                JUMPDEST => {}
                PUSH0 => self.push(U256::ZERO)?,
                PUSH1..=PUSH32 => {
                    let len = (opcode - PUSH1 + 1) as usize;
                    let mut word = [0u8; 32];
                    let available = self.code.len().saturating_sub(self.pc).min(len);
                    let start = 32 - len;
                    word[start..start + available]
                        .copy_from_slice(&self.code[self.pc..self.pc + available]);
                    self.pc += len;
                    self.push(U256::from_be_bytes(word))?;
                }
                DUP1..=DUP16 => {
                    let depth = (opcode - DUP1 + 1) as usize;
                    let index = self
                        .stack
                        .len()
                        .checked_sub(depth)
                        .ok_or(InterpreterError::StackUnderflow)?;
                    self.push(self.stack[index])?;
                }
                SWAP1..=SWAP16 => {
                    let depth = (opcode - SWAP1 + 1) as usize;
                    let top = self
                        .stack
                        .len()
                        .checked_sub(1)
                        .ok_or(InterpreterError::StackUnderflow)?;
                    let other = top
                        .checked_sub(depth)
                        .ok_or(InterpreterError::StackUnderflow)?;
                    self.stack.swap(top, other);
                }
                CALL => {
                    let _gas = self.pop()?;
                    let to = word_address(self.pop()?);
                    let value = self.pop()?;
                    if self.frame.is_static && !value.is_zero() {
                        return Err(InterpreterError::StaticViolation);
                    }
                    let (input, ret) = self.call_regions()?;
                    let child = self.frame.child_call(to, value, input);
                    self.finish_call(ledger.call(child), ret)?;
                }
                DELEGATECALL => {
                    let _gas = self.pop()?;
                    let code_address = word_address(self.pop()?);
                    let (input, ret) = self.call_regions()?;
                    let child = self.frame.child_delegate_call(code_address, input);
                    self.finish_call(ledger.call(child), ret)?;
                }
                STATICCALL => {
                    let _gas = self.pop()?;
                    let to = word_address(self.pop()?);
                    let (input, ret) = self.call_regions()?;
                    let child = self.frame.child_static_call(to, input);
                    self.finish_call(ledger.call(child), ret)?;
                }
                RETURN => {
                    let (offset, size) = (self.pop()?, self.pop()?);
                    let range = self.memory_range(offset, size)?;
                    return Ok(Halt::Return(Bytes::copy_from_slice(&self.memory[range])));
                }
                REVERT => {
                    let (offset, size) = (self.pop()?, self.pop()?);
                    let range = self.memory_range(offset, size)?;
                    return Ok(Halt::Revert(Bytes::copy_from_slice(&self.memory[range])));
                }
                other => return Err(InterpreterError::UnsupportedOpcode(other)),
            }
        }
        Ok(Halt::Stop)
    }

    fn pop(&mut self) -> Result<U256, InterpreterError> {
        self.stack.pop().ok_or(InterpreterError::StackUnderflow)
    }

    fn push(&mut self, value: U256) -> Result<(), InterpreterError> {
        if self.stack.len() == STACK_LIMIT {
            return Err(InterpreterError::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    fn binary(&mut self, op: impl FnOnce(U256, U256) -> U256) -> Result<(), InterpreterError> {
        let (a, b) = (self.pop()?, self.pop()?);
        self.push(op(a, b))
    }

    fn jump(&mut self, dest: U256) -> Result<(), InterpreterError> {
        let target = if dest < U256::from(self.code.len()) {
            dest.as_limbs()[0] as usize
        } else {
            usize::MAX
        };
        if !self.jumpdests.get(target).copied().unwrap_or(false) {
            return Err(InterpreterError::InvalidJump(target));
        }
        self.pc = target;
        Ok(())
    }

    /// Expands memory to cover `offset..offset + size` and returns the range.
    fn memory_range(&mut self, offset: U256, size: U256) -> Result<Range<usize>, InterpreterError> {
        if size.is_zero() {
            return Ok(0..0);
        }
        let limit = U256::from(MEMORY_LIMIT);
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= limit)
            .ok_or(InterpreterError::MemoryLimit)?;
        let end = end.as_limbs()[0] as usize;
        let start = end - size.as_limbs()[0] as usize;

        if self.memory.len() < end {
            self.memory.resize(end.div_ceil(32) * 32, 0);
        }
        Ok(start..end)
    }

    /// Pops the argument and return regions of a call, returning the
    /// calldata and the return range.
    fn call_regions(&mut self) -> Result<(Bytes, Range<usize>), InterpreterError> {
        let (args_offset, args_size) = (self.pop()?, self.pop()?);
        let (ret_offset, ret_size) = (self.pop()?, self.pop()?);
        let args = self.memory_range(args_offset, args_size)?;
        let ret = self.memory_range(ret_offset, ret_size)?;
        Ok((Bytes::copy_from_slice(&self.memory[args]), ret))
    }

    fn finish_call(
        &mut self,
        outcome: CallOutcome,
        ret: Range<usize>,
    ) -> Result<(), InterpreterError> {
        let copied = ret.len().min(outcome.output.len());
        self.memory[ret.start..ret.start + copied].copy_from_slice(&outcome.output[..copied]);
        self.return_data = outcome.output;
        self.push(flag(outcome.success))
    }
}

/// Marks every `JUMPDEST` that is an instruction rather than push data.
fn analyze_jumpdests(code: &[u8]) -> Vec<bool> {
    let mut jumpdests = vec![false; code.len()];
    let mut pc = 0;
    while let Some(&opcode) = code.get(pc) {
        if opcode == JUMPDEST {
            jumpdests[pc] = true;
        }
        pc += 1;
        if (PUSH1..=PUSH32).contains(&opcode) {
            pc += (opcode - PUSH1 + 1) as usize;
        }
    }
    jumpdests
}

/// Copies `src[offset..]` into `dest`, zero-filling past the end of `src`.
fn copy_padded(dest: &mut [u8], src: &[u8], offset: U256) {
    let start = if offset > U256::from(src.len()) {
        src.len()
    } else {
        offset.as_limbs()[0] as usize
    };
    let available = &src[start..];
    let copied = available.len().min(dest.len());
    dest[..copied].copy_from_slice(&available[..copied]);
    dest[copied..].fill(0);
}

fn flag(condition: bool) -> U256 {
    if condition {
        U256::from(1)
    } else {
        U256::ZERO
    }
}

fn address_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

fn word_address(word: U256) -> Address {
    Address::from_word(B256::from(word.to_be_bytes::<32>()))
}
