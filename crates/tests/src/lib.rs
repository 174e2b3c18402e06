//! Integration tests for the cold-storage relay
//!
//! This crate drives the hub and real proxy bytecode on the journaled ledger,
//! with shared fixtures for the token and auxiliary logic contracts the
//! scenarios interact with.

pub mod common;


pub use common::*;
