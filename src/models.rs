//! Shared data structures used throughout the application.

use crate::errors::SwapError;
use ethers::types::{Address, H256, TxHash, U256};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Address of a token contract. Whether it is a real ERC20 is left to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TokenHandle(Address);

impl TokenHandle {
    pub fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl FromStr for TokenHandle {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Address>()
            .map(Self)
            .map_err(|_| SwapError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for TokenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Opaque `bytes32` pool key returned by the swapper contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolId(pub H256);

impl PoolId {
    /// The contract answers unknown pairs with an all-zero key.
    pub fn is_unset(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<[u8; 32]> for PoolId {
    fn from(raw: [u8; 32]) -> Self {
        Self(H256(raw))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Raw field values exactly as the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapForm {
    pub token0: String,
    pub token1: String,
    pub amount0: String,
    pub amount1: String,
}

impl SwapForm {
    /// Read the form at trigger time. Only the addresses are parsed here;
    /// amounts stay raw until the orchestrator normalizes them.
    pub fn into_request(self) -> Result<SwapRequest, SwapError> {
        Ok(SwapRequest {
            token0: self.token0.parse()?,
            token1: self.token1.parse()?,
            amount0: self.amount0,
            amount1: self.amount1,
        })
    }
}

/// One swap attempt, built fresh per user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub token0: TokenHandle,
    pub token1: TokenHandle,
    pub amount0: String,
    pub amount1: String,
}

/// Parameters of a `createPool` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolRequest {
    pub token0: TokenHandle,
    pub token1: TokenHandle,
    pub amount0: String,
    pub amount1: String,
    /// Passed to the contract as a plain integer.
    pub swap_fee: String,
}

/// Transactions that made up a completed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub pool_id: PoolId,
    pub token_in: TokenHandle,
    pub amount_in: U256,
    pub approve0_tx: TxHash,
    pub approve1_tx: TxHash,
    pub swap_tx: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePoolReceipt {
    pub approve0_tx: TxHash,
    pub approve1_tx: TxHash,
    pub create_tx: TxHash,
}

/// Terminal result of `execute_swap`, surfaced to the user and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Success(SwapReceipt),
    Failure(SwapError),
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwapOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&SwapError> {
        match self {
            SwapOutcome::Success(_) => None,
            SwapOutcome::Failure(err) => Some(err),
        }
    }
}

impl From<Result<SwapReceipt, SwapError>> for SwapOutcome {
    fn from(result: Result<SwapReceipt, SwapError>) -> Self {
        match result {
            Ok(receipt) => SwapOutcome::Success(receipt),
            Err(err) => SwapOutcome::Failure(err),
        }
    }
}
