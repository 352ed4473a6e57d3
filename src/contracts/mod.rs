//! Contract bindings for the ERC20 tokens and the swapper contract.
//!
//! Callers only see the [`TokenContract`] and [`SwapperContract`] traits. The
//! ethers-backed implementation lives in [`client`]; a recording in-memory chain
//! used by the tests lives in `mock`.

use crate::errors::SwapError;
use crate::models::PoolId;
use crate::wallet::Session;
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    types::{Address, TxHash, U256},
};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub mod client;
#[cfg(test)]
pub(crate) mod mock;

abigen!(
    Erc20,
    r"[
        function approve(address spender, uint256 amount) external returns (bool)
    ]",
);

abigen!(
    Swapper,
    r"[
        function createPool(address token0, address token1, uint256 amount0, uint256 amount1, uint256 swapFee) external
        function swap(bytes32 poolId, address tokenIn, uint256 amountIn) external
        function getPoolId(address token0, address token1) external view returns (bytes32)
        function addToken(address tokenAddress) external
    ]",
);

/// Failure reported by the chain or the wallet, kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

type ReceiptFuture = Pin<Box<dyn Future<Output = Result<(), RemoteError>> + Send>>;

/// A signed and broadcast transaction whose receipt is still outstanding.
pub struct Submitted {
    tx_hash: TxHash,
    receipt: ReceiptFuture,
}

impl Submitted {
    pub fn new(
        tx_hash: TxHash,
        receipt: impl Future<Output = Result<(), RemoteError>> + Send + 'static,
    ) -> Self {
        Self {
            tx_hash,
            receipt: Box::pin(receipt),
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Wait until the transaction is mined successfully.
    pub async fn mined(self) -> Result<TxHash, RemoteError> {
        self.receipt.await?;
        Ok(self.tx_hash)
    }
}

impl fmt::Debug for Submitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitted")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// The `approve` slice of an ERC20 token, signed by the connected account.
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast an allowance of exactly `amount` for `spender`.
    async fn approve(&self, spender: Address, amount: U256) -> Result<Submitted, RemoteError>;
}

/// The swapper contract, signed by the connected account.
///
/// Mutating calls resolve once the transaction is broadcast; the returned
/// [`Submitted`] waits for the receipt.
#[async_trait]
pub trait SwapperContract: Send + Sync {
    fn address(&self) -> Address;

    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
        amount0: U256,
        amount1: U256,
        swap_fee: U256,
    ) -> Result<Submitted, RemoteError>;

    /// Read-only lookup; tokens are passed in the order given.
    async fn get_pool_id(&self, token0: Address, token1: Address) -> Result<PoolId, RemoteError>;

    async fn swap(
        &self,
        pool_id: PoolId,
        token_in: Address,
        amount_in: U256,
    ) -> Result<Submitted, RemoteError>;

    async fn add_token(&self, token: Address) -> Result<Submitted, RemoteError>;
}

/// Signing identity of a connected wallet. Binding is pure construction.
pub trait SigningCapability: Send + Sync {
    fn account(&self) -> Address;

    fn token(&self, address: Address) -> Arc<dyn TokenContract>;

    fn swapper(&self, address: Address) -> Arc<dyn SwapperContract>;
}

/// Bind the ERC20 approval interface at `address` to the session's signer.
pub fn bind_token(session: &Session, address: Address) -> Result<Arc<dyn TokenContract>, SwapError> {
    Ok(session.signer()?.token(address))
}

/// Bind the swapper interface at `address` to the session's signer.
pub fn bind_swapper(
    session: &Session,
    address: Address,
) -> Result<Arc<dyn SwapperContract>, SwapError> {
    Ok(session.signer()?.swapper(address))
}
