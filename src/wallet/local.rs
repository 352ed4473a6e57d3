use super::WalletProvider;
use crate::config::{AppConfig, WalletConfig};
use crate::contracts::SigningCapability;
use crate::contracts::client::{Confirmation, EthersSigner, SignerClient};
use crate::errors::{Result, SwapError};
use crate::utils::confirm_prompt;
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::Address,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Wallet backed by a private key held by this process.
pub struct LocalKeyWallet {
    client: Arc<SignerClient>,
    confirmation: Confirmation,
}

impl LocalKeyWallet {
    /// Build the wallet if a key is configured.
    ///
    /// `Ok(None)` means there is nothing to connect to: no key, an unparsable
    /// key, or a node that cannot report its chain id.
    pub async fn discover(wallet: &WalletConfig, config: &AppConfig) -> Result<Option<Self>> {
        let Some(key) = wallet.private_key.as_deref() else {
            warn!("[WALLET] WALLET_PRIVATE_KEY not set");
            return Ok(None);
        };
        let signer: LocalWallet = match key.trim_start_matches("0x").parse() {
            Ok(signer) => signer,
            Err(e) => {
                warn!(error = %e, "[WALLET] WALLET_PRIVATE_KEY is not a valid secp256k1 key");
                return Ok(None);
            }
        };

        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?;
        let chain_id = match config.chain_id {
            Some(id) => id,
            None => match provider.get_chainid().await {
                Ok(id) => id.as_u64(),
                Err(e) => {
                    warn!(error = %e, rpc = %config.rpc_url, "[WALLET] node unreachable");
                    return Ok(None);
                }
            },
        };
        info!(chain_id, account = ?signer.address(), "[WALLET] local key loaded");

        let client = SignerMiddleware::new(provider, signer.with_chain_id(chain_id));
        let confirmation = if config.auto_approve {
            Confirmation::Auto
        } else {
            Confirmation::Prompt
        };
        Ok(Some(Self {
            client: Arc::new(client),
            confirmation,
        }))
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }
}

#[async_trait]
impl WalletProvider for LocalKeyWallet {
    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, SwapError> {
        let account = self.address();
        if self.confirmation == Confirmation::Prompt {
            let answer = confirm_prompt(format!("Connect account {account:?}?")).await;
            grant(answer)?;
        }
        Ok(vec![account])
    }

    fn signer(&self) -> Arc<dyn SigningCapability> {
        Arc::new(EthersSigner::new(self.client.clone(), self.confirmation))
    }
}

/// Only an explicit yes grants access. A prompt that cannot be shown is a refusal.
fn grant(answer: std::io::Result<bool>) -> std::result::Result<(), SwapError> {
    match answer {
        Ok(true) => Ok(()),
        Ok(false) => Err(SwapError::UserDenied),
        Err(e) => {
            warn!(error = %e, "[WALLET] connection prompt failed, treating as denied");
            Err(SwapError::UserDenied)
        }
    }
}
