//! Configuration loader and application settings.

use crate::amount::DEFAULT_DECIMALS;
use crate::errors::{AppError, Result};
use crate::swap::OrchestratorConfig;
use crate::utils::parse_flag;
use ethers::types::Address;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Deployed swapper contract used when `SWAPPER_ADDRESS` is not set.
pub const DEFAULT_SWAPPER_ADDRESS: &str = "0x857F841e2cd3adE01FcC63F4c9AEeBdAB659ebCB";

/// How long a single step may wait for its transaction to be mined.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC endpoint for the Ethereum-compatible node.
    pub rpc_url: Url,
    pub swapper_address: Address,
    /// Chain id used for signing; queried from the node when absent.
    pub chain_id: Option<u64>,
    /// Precision applied to both tokens of a pair.
    pub token_decimals: u8,
    /// `None` waits for confirmations indefinitely.
    pub confirmation_timeout: Option<Duration>,
    /// Skip interactive wallet prompts.
    pub auto_approve: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = lookup("RPC_URL")
            .ok_or_else(|| AppError::Config("set RPC_URL to your node's HTTP endpoint".into()))?;
        let rpc_url = Url::parse(rpc_url.trim())?;

        let swapper_address = match parse_var(&lookup, "SWAPPER_ADDRESS")? {
            Some(address) => address,
            None => DEFAULT_SWAPPER_ADDRESS
                .parse::<Address>()
                .map_err(|e| AppError::Config(format!("default swapper address: {e}")))?,
        };
        let chain_id = parse_var(&lookup, "CHAIN_ID")?;
        let token_decimals = parse_var(&lookup, "TOKEN_DECIMALS")?.unwrap_or(DEFAULT_DECIMALS);
        if token_decimals > 77 {
            return Err(AppError::Config(format!(
                "TOKEN_DECIMALS={token_decimals} does not fit a uint256"
            )));
        }
        let timeout_secs = parse_var(&lookup, "CONFIRMATION_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS);
        let confirmation_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        let auto_approve = lookup("WALLET_AUTO_APPROVE").is_some_and(|v| parse_flag(&v));

        Ok(Self {
            rpc_url,
            swapper_address,
            chain_id,
            token_decimals,
            confirmation_timeout,
            auto_approve,
        })
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            swapper: self.swapper_address,
            token0_decimals: self.token_decimals,
            token1_decimals: self.token_decimals,
            confirmation_timeout: self.confirmation_timeout,
        }
    }
}

/// Key material for the local wallet. Kept apart from [`AppConfig`] so it is
/// never printed.
#[derive(Clone, Default)]
pub struct WalletConfig {
    pub private_key: Option<String>,
}

impl WalletConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let private_key = lookup("WALLET_PRIVATE_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self { private_key }
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
