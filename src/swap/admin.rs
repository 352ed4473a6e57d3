//! Owner-side actions on the swapper contract.
//!
//! The contract decides who may call these; nothing is checked locally.

use super::{OrchestratorConfig, approve, transact};
use crate::amount::normalize;
use crate::contracts::{bind_swapper, bind_token};
use crate::errors::{Leg, Step, SwapError};
use crate::models::{CreatePoolReceipt, CreatePoolRequest, TokenHandle};
use crate::wallet::Session;
use ethers::types::TxHash;
use tracing::{info, warn};

/// Add `token` to the swapper's allow-list with a single `addToken` call.
pub async fn add_token(
    session: &Session,
    config: &OrchestratorConfig,
    token: TokenHandle,
) -> Result<TxHash, SwapError> {
    let swapper = bind_swapper(session, config.swapper)?;
    info!(%token, "[ADMIN] adding token");
    let result = transact(config, Step::AddToken, swapper.add_token(token.address()))
        .await
        .and_then(|res| res.map_err(|e| SwapError::AddTokenFailed(e.0)));
    match &result {
        Ok(tx) => info!(%token, ?tx, "[ADMIN] token added"),
        Err(err) => warn!(%token, error = %err, "[ADMIN] add token failed"),
    }
    result
}

/// Approve both amounts for the swapper, then create the pool.
///
/// Abort rules match the swap: an approval that already went through stays granted.
pub async fn create_pool(
    session: &Session,
    config: &OrchestratorConfig,
    request: &CreatePoolRequest,
) -> Result<CreatePoolReceipt, SwapError> {
    session.signer()?;
    let amount0 = normalize(&request.amount0, config.token0_decimals)?;
    let amount1 = normalize(&request.amount1, config.token1_decimals)?;
    let swap_fee = normalize(&request.swap_fee, 0)?;

    let token0 = bind_token(session, request.token0.address())?;
    let token1 = bind_token(session, request.token1.address())?;
    let swapper = bind_swapper(session, config.swapper)?;

    let approve0_tx = approve(config, token0.as_ref(), Leg::Token0, amount0).await?;
    let approve1_tx = approve(config, token1.as_ref(), Leg::Token1, amount1).await?;

    info!(
        token0 = %request.token0,
        token1 = %request.token1,
        %swap_fee,
        "[ADMIN] creating pool"
    );
    let create_tx = transact(
        config,
        Step::CreatePool,
        swapper.create_pool(
            request.token0.address(),
            request.token1.address(),
            amount0,
            amount1,
            swap_fee,
        ),
    )
    .await?
    .map_err(|e| SwapError::CreatePoolFailed(e.0))?;
    info!(?create_tx, "[ADMIN] pool created");

    Ok(CreatePoolReceipt {
        approve0_tx,
        approve1_tx,
        create_tx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::mock::{Call, MockChain};
    use ethers::types::{Address, U256};
    use std::time::Duration;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig::new(Address::repeat_byte(0x5e))
    }

    fn token() -> TokenHandle {
        TokenHandle::new(Address::repeat_byte(0x70))
    }

    fn pool_request(swap_fee: &str) -> CreatePoolRequest {
        CreatePoolRequest {
            token0: TokenHandle::new(Address::repeat_byte(0xaa)),
            token1: TokenHandle::new(Address::repeat_byte(0xbb)),
            amount0: "100".into(),
            amount1: "250.5".into(),
            swap_fee: swap_fee.into(),
        }
    }

    #[tokio::test]
    async fn add_token_is_a_single_call() {
        let chain = MockChain::new();
        add_token(&chain.session(), &config(), token()).await.unwrap();
        assert_eq!(
            chain.calls(),
            vec![Call::AddToken {
                token: token().address()
            }]
        );
    }

    #[tokio::test]
    async fn add_token_requires_connection() {
        let chain = MockChain::new();
        let err = add_token(&Session::disconnected(), &config(), token())
            .await
            .unwrap_err();
        assert_eq!(err, SwapError::NotConnected);
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn add_token_surfaces_rejection_verbatim() {
        let chain = MockChain::new();
        chain.fail_add_token("Ownable: caller is not the owner");
        let err = add_token(&chain.session(), &config(), token())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::AddTokenFailed("Ownable: caller is not the owner".into())
        );
        assert_eq!(err.step(), Step::AddToken);
    }

    #[tokio::test(start_paused = true)]
    async fn add_token_waits_out_a_slow_signature() {
        let chain = MockChain::new();
        chain.slow_signing(Duration::from_secs(900));
        let config = config().with_timeout(Duration::from_secs(30));
        add_token(&chain.session(), &config, token()).await.unwrap();
        assert_eq!(chain.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_pool_approves_then_creates() {
        let chain = MockChain::new();
        create_pool(&chain.session(), &config(), &pool_request("30"))
            .await
            .unwrap();

        let calls = chain.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], Call::Approve { token, .. } if token == Address::repeat_byte(0xaa)));
        assert!(matches!(calls[1], Call::Approve { token, .. } if token == Address::repeat_byte(0xbb)));
        assert_eq!(
            calls[2],
            Call::CreatePool {
                token0: Address::repeat_byte(0xaa),
                token1: Address::repeat_byte(0xbb),
                amount0: U256::from(100u64) * U256::exp10(18),
                amount1: U256::from(2505u64) * U256::exp10(17),
                swap_fee: U256::from(30u64),
            }
        );
    }

    #[tokio::test]
    async fn fractional_fee_is_rejected_before_any_call() {
        let chain = MockChain::new();
        let err = create_pool(&chain.session(), &config(), &pool_request("0.3"))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount { .. }));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn create_pool_failure_keeps_approvals() {
        let chain = MockChain::new();
        chain.fail_create_pool("execution reverted: pool exists");
        let err = create_pool(&chain.session(), &config(), &pool_request("30"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::CreatePoolFailed("execution reverted: pool exists".into())
        );
        assert_eq!(chain.count(|c| matches!(c, Call::Approve { .. })), 2);
    }
}
