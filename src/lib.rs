//! Core library for the dex-swap client.
//!
//! Connects a wallet, approves two ERC20 tokens for a swapper contract,
//! resolves the pair's pool and submits the swap. The binary (`main.rs`)
//! wires these pieces to the command line.

pub mod amount;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod models;
pub mod notify;
pub mod swap;
pub mod utils;
pub mod wallet;
