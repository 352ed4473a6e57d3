//! Wallet session: account access and the signing capability it unlocks.

use crate::contracts::SigningCapability;
use crate::errors::SwapError;
use async_trait::async_trait;
use ethers::types::Address;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub mod local;

/// Source of accounts and signatures, e.g. a local key.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user for account access. May prompt; fails with
    /// [`SwapError::UserDenied`] when the user refuses.
    async fn request_accounts(&self) -> Result<Vec<Address>, SwapError>;

    fn signer(&self) -> Arc<dyn SigningCapability>;
}

/// Connection to the user's wallet. Connected iff a signer is present.
#[derive(Clone)]
pub struct Session {
    account: Option<Address>,
    signer: Option<Arc<dyn SigningCapability>>,
}

impl Session {
    pub fn disconnected() -> Self {
        Self {
            account: None,
            signer: None,
        }
    }

    pub(crate) fn connected(account: Address, signer: Arc<dyn SigningCapability>) -> Self {
        Self {
            account: Some(account),
            signer: Some(signer),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn signer(&self) -> Result<&Arc<dyn SigningCapability>, SwapError> {
        self.signer.as_ref().ok_or(SwapError::NotConnected)
    }

    /// Drop the signer, e.g. after the wallet went away. There is no reconnect.
    pub fn disconnect(&mut self) {
        if self.signer.take().is_some() {
            warn!(account = ?self.account, "[WALLET] session disconnected");
        }
        self.account = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.is_connected())
            .field("account", &self.account)
            .finish()
    }
}

/// Request account access once and build a session around the granted account.
///
/// `None` means no wallet provider exists at all.
pub async fn connect(provider: Option<&dyn WalletProvider>) -> Result<Session, SwapError> {
    let provider = provider.ok_or(SwapError::WalletUnavailable)?;
    let accounts = provider.request_accounts().await?;
    let account = accounts.first().copied().ok_or(SwapError::UserDenied)?;
    let signer = provider.signer();
    info!(?account, "[WALLET] connected");
    Ok(Session::connected(account, signer))
}
