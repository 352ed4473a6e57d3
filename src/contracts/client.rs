use super::{
    Erc20, RemoteError, SigningCapability, Submitted, Swapper, SwapperContract, TokenContract,
};
use crate::models::PoolId;
use crate::utils::confirm_prompt;
use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::ContractCall,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::LocalWallet,
    types::{Address, U64, U256},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Node connection with the local key attached as signer.
pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Whether every mutating call waits for an explicit "yes" before broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Auto,
    Prompt,
}

impl Confirmation {
    async fn request(self, question: String) -> Result<(), RemoteError> {
        match self {
            Confirmation::Auto => Ok(()),
            Confirmation::Prompt => match confirm_prompt(question).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(RemoteError::new("user rejected the transaction")),
                Err(e) => Err(RemoteError::new(format!("confirmation prompt failed: {e}"))),
            },
        }
    }
}

/// [`SigningCapability`] backed by an ethers `SignerMiddleware`.
#[derive(Clone)]
pub struct EthersSigner {
    client: Arc<SignerClient>,
    confirmation: Confirmation,
}

impl EthersSigner {
    pub fn new(client: Arc<SignerClient>, confirmation: Confirmation) -> Self {
        Self {
            client,
            confirmation,
        }
    }
}

impl SigningCapability for EthersSigner {
    fn account(&self) -> Address {
        self.client.address()
    }

    fn token(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(EthersToken {
            contract: Erc20::new(address, self.client.clone()),
            client: self.client.clone(),
            confirmation: self.confirmation,
        })
    }

    fn swapper(&self, address: Address) -> Arc<dyn SwapperContract> {
        Arc::new(EthersSwapper {
            contract: Swapper::new(address, self.client.clone()),
            client: self.client.clone(),
            confirmation: self.confirmation,
        })
    }
}

struct EthersToken {
    contract: Erc20<SignerClient>,
    client: Arc<SignerClient>,
    confirmation: Confirmation,
}

#[async_trait]
impl TokenContract for EthersToken {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<Submitted, RemoteError> {
        let label = format!(
            "approve({spender:?}, {amount}) on token {:?}",
            self.contract.address()
        );
        let call = self.contract.approve(spender, amount);
        submit(call, label, self.confirmation, &self.client).await
    }
}

struct EthersSwapper {
    contract: Swapper<SignerClient>,
    client: Arc<SignerClient>,
    confirmation: Confirmation,
}

#[async_trait]
impl SwapperContract for EthersSwapper {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
        amount0: U256,
        amount1: U256,
        swap_fee: U256,
    ) -> Result<Submitted, RemoteError> {
        let label = format!("createPool({token0:?}, {token1:?}, {amount0}, {amount1}, {swap_fee})");
        let call = self
            .contract
            .create_pool(token0, token1, amount0, amount1, swap_fee);
        submit(call, label, self.confirmation, &self.client).await
    }

    async fn get_pool_id(&self, token0: Address, token1: Address) -> Result<PoolId, RemoteError> {
        let raw = self
            .contract
            .get_pool_id(token0, token1)
            .call()
            .await
            .map_err(|e| RemoteError::new(e.to_string()))?;
        Ok(PoolId::from(raw))
    }

    async fn swap(
        &self,
        pool_id: PoolId,
        token_in: Address,
        amount_in: U256,
    ) -> Result<Submitted, RemoteError> {
        let label = format!("swap({pool_id}, {token_in:?}, {amount_in})");
        let call = self.contract.swap(pool_id.0.0, token_in, amount_in);
        submit(call, label, self.confirmation, &self.client).await
    }

    async fn add_token(&self, token: Address) -> Result<Submitted, RemoteError> {
        let label = format!("addToken({token:?})");
        let call = self.contract.add_token(token);
        submit(call, label, self.confirmation, &self.client).await
    }
}

/// Ask for confirmation and broadcast. The receipt is awaited by the returned handle.
///
/// A dropped transaction or a receipt with status other than 1 is a failure.
async fn submit<D: Detokenize + Send + Sync>(
    call: ContractCall<SignerClient, D>,
    label: String,
    confirmation: Confirmation,
    client: &Arc<SignerClient>,
) -> Result<Submitted, RemoteError> {
    confirmation
        .request(format!("Sign and broadcast {label}?"))
        .await?;

    let tx_hash = call
        .send()
        .await
        .map_err(|e| RemoteError::new(e.to_string()))?
        .tx_hash();
    info!(?tx_hash, %label, "[TX] broadcast, awaiting receipt");

    let client = client.clone();
    Ok(Submitted::new(tx_hash, async move {
        let receipt = PendingTransaction::new(tx_hash, client.provider())
            .await
            .map_err(|e| RemoteError::new(e.to_string()))?
            .ok_or_else(|| {
                RemoteError::new(format!("transaction {tx_hash:?} dropped before inclusion"))
            })?;
        debug!(?receipt, "[TX] receipt");

        if receipt.status != Some(U64::from(1)) {
            return Err(RemoteError::new(format!("transaction {tx_hash:?} reverted")));
        }
        info!(?tx_hash, block = ?receipt.block_number, %label, "[TX] confirmed");
        Ok(())
    }))
}
