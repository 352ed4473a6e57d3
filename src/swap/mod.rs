//! Swap orchestration: approve both tokens, resolve the pool, submit the swap.
//!
//! Every step waits for the previous one to be confirmed on-chain. A failure
//! stops the sequence where it happened; earlier approvals stay granted, since
//! on-chain approvals cannot be rolled back. Nothing is retried automatically.
//! Approvals set an absolute allowance, so re-running a failed swap is safe.

use crate::amount::{DEFAULT_DECIMALS, normalize};
use crate::contracts::{
    RemoteError, Submitted, SwapperContract, TokenContract, bind_swapper, bind_token,
};
use crate::errors::{Leg, Step, SwapError};
use crate::models::{PoolId, SwapOutcome, SwapReceipt, SwapRequest, TokenHandle};
use crate::wallet::Session;
use ethers::types::{Address, TxHash, U256};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub mod admin;

/// Addresses and policies shared by every action against the swapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub swapper: Address,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
    /// Upper bound on each step's wait for its receipt; `None` waits forever.
    /// Time spent signing is not counted.
    pub confirmation_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    pub fn new(swapper: Address) -> Self {
        Self {
            swapper,
            token0_decimals: DEFAULT_DECIMALS,
            token1_decimals: DEFAULT_DECIMALS,
            confirmation_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }
}

/// Runs swaps for one session, one at a time.
pub struct SwapOrchestrator {
    session: Session,
    config: OrchestratorConfig,
    in_flight: Mutex<()>,
}

impl SwapOrchestrator {
    pub fn new(session: Session, config: OrchestratorConfig) -> Self {
        Self {
            session,
            config,
            in_flight: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Approve token0, approve token1, look up the pool and swap token0 in.
    pub async fn execute_swap(&self, request: &SwapRequest) -> SwapOutcome {
        info!(
            token0 = %request.token0,
            token1 = %request.token1,
            amount0 = %request.amount0,
            amount1 = %request.amount1,
            "[SWAP] requested"
        );
        let outcome = SwapOutcome::from(self.run(request).await);
        match &outcome {
            SwapOutcome::Success(receipt) => {
                info!(pool_id = %receipt.pool_id, swap_tx = ?receipt.swap_tx, "[SWAP] completed");
            }
            SwapOutcome::Failure(err) => {
                warn!(step = %err.step(), error = %err, "[SWAP] aborted");
            }
        }
        outcome
    }

    async fn run(&self, request: &SwapRequest) -> Result<SwapReceipt, SwapError> {
        self.session.signer()?;
        let _guard = self.in_flight.try_lock().map_err(|_| SwapError::Busy)?;

        let amount0 = normalize(&request.amount0, self.config.token0_decimals)?;
        let amount1 = normalize(&request.amount1, self.config.token1_decimals)?;

        let token0 = bind_token(&self.session, request.token0.address())?;
        let token1 = bind_token(&self.session, request.token1.address())?;
        let swapper = bind_swapper(&self.session, self.config.swapper)?;

        let approve0_tx = approve(&self.config, token0.as_ref(), Leg::Token0, amount0).await?;
        let approve1_tx = approve(&self.config, token1.as_ref(), Leg::Token1, amount1).await?;
        info!("[SWAP] tokens approved");

        let pool_id = resolve_pool(&self.config, swapper.as_ref(), request.token0, request.token1)
            .await?;
        let swap_tx = transact(
            &self.config,
            Step::Swap,
            swapper.swap(pool_id, request.token0.address(), amount0),
        )
        .await?
        .map_err(|e| SwapError::SwapExecutionFailed(e.0))?;

        Ok(SwapReceipt {
            pool_id,
            token_in: request.token0,
            amount_in: amount0,
            approve0_tx,
            approve1_tx,
            swap_tx,
        })
    }
}

/// Wait for `fut`, bounded by the configured confirmation timeout.
///
/// The outer error is the timeout; the inner one is the chain's answer.
async fn bounded<T>(
    config: &OrchestratorConfig,
    step: Step,
    fut: impl Future<Output = Result<T, RemoteError>>,
) -> Result<Result<T, RemoteError>, SwapError> {
    match config.confirmation_timeout {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| SwapError::TimedOut { step, after }),
        None => Ok(fut.await),
    }
}

/// Sign and broadcast through `submit`, then wait for the receipt.
///
/// Only the receipt wait is bounded. The outer error is the timeout; the inner
/// one is the signer's or the chain's answer.
pub(crate) async fn transact(
    config: &OrchestratorConfig,
    step: Step,
    submit: impl Future<Output = Result<Submitted, RemoteError>>,
) -> Result<Result<TxHash, RemoteError>, SwapError> {
    let submitted = match submit.await {
        Ok(submitted) => submitted,
        Err(e) => return Ok(Err(e)),
    };
    bounded(config, step, submitted.mined()).await
}

/// Grant the swapper an allowance of exactly `amount` on `token`.
pub(crate) async fn approve(
    config: &OrchestratorConfig,
    token: &dyn TokenContract,
    leg: Leg,
    amount: U256,
) -> Result<TxHash, SwapError> {
    info!(%leg, token = ?token.address(), %amount, "[SWAP] approving");
    transact(config, leg.approve_step(), token.approve(config.swapper, amount))
        .await?
        .map_err(|e| SwapError::ApprovalFailed {
            leg,
            token: token.address(),
            reason: e.0,
        })
}

/// Look up the pool for the pair in the order given. A zero id means no pool.
pub(crate) async fn resolve_pool(
    config: &OrchestratorConfig,
    swapper: &dyn SwapperContract,
    token0: TokenHandle,
    token1: TokenHandle,
) -> Result<PoolId, SwapError> {
    let not_found = |reason: String| SwapError::PoolNotFound {
        token0: token0.address(),
        token1: token1.address(),
        reason,
    };
    let pool_id = bounded(
        config,
        Step::ResolvePool,
        swapper.get_pool_id(token0.address(), token1.address()),
    )
    .await?
    .map_err(|e| not_found(e.0))?;
    if pool_id.is_unset() {
        return Err(not_found("no pool registered for this pair".into()));
    }
    info!(%pool_id, "[SWAP] pool resolved");
    Ok(pool_id)
}
