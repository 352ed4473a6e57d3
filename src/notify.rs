//! User-facing notices for every terminal outcome.

use crate::amount::format_units;
use crate::errors::{Step, SwapError};
use crate::models::{CreatePoolReceipt, SwapOutcome, TokenHandle};
use ethers::types::{Address, TxHash};
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// A blocking message for the user; failures always name their step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub step: Option<Step>,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            step: None,
            message: message.into(),
        }
    }

    pub fn failure(err: &SwapError) -> Self {
        let step = err.step();
        let message = match err {
            SwapError::WalletUnavailable => {
                "No wallet available. Set WALLET_PRIVATE_KEY (and RPC_URL) and try again.".to_string()
            }
            SwapError::UserDenied => {
                "Wallet access was denied. Please connect your wallet to continue.".to_string()
            }
            SwapError::NotConnected => {
                "Wallet is not connected. Connect a wallet before trying again.".to_string()
            }
            SwapError::TimedOut { .. } => format!(
                "{err}. The transaction may still be mined; check the chain before retrying."
            ),
            _ => format!("Failed to {step}: {err}"),
        };
        Self {
            level: NoticeLevel::Failure,
            step: Some(step),
            message,
        }
    }

    pub fn from_swap(outcome: &SwapOutcome, decimals: u8) -> Self {
        match outcome {
            SwapOutcome::Success(receipt) => Self::success(format!(
                "Swap successful! Swapped {} of {} in pool {} (tx {:?})",
                format_units(receipt.amount_in, decimals),
                receipt.token_in,
                receipt.pool_id,
                receipt.swap_tx
            )),
            SwapOutcome::Failure(err) => Self::failure(err),
        }
    }

    pub fn from_add_token(token: TokenHandle, result: &Result<TxHash, SwapError>) -> Self {
        match result {
            Ok(tx) => Self::success(format!("Token {token} added successfully! (tx {tx:?})")),
            Err(err) => Self::failure(err),
        }
    }

    pub fn from_create_pool(result: &Result<CreatePoolReceipt, SwapError>) -> Self {
        match result {
            Ok(receipt) => Self::success(format!(
                "Pool created successfully! (tx {:?})",
                receipt.create_tx
            )),
            Err(err) => Self::failure(err),
        }
    }

    pub fn connected(account: Address) -> Self {
        Self::success(format!("Connected account {account:?}"))
    }

    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

/// Where notices are shown.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Prints notices on stdout, as text or one JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    pub json: bool,
}

impl ConsoleNotifier {
    fn render(&self, notice: &Notice) -> String {
        if self.json {
            serde_json::to_string(notice).unwrap_or_else(|e| {
                format!(r#"{{"level":"failure","step":null,"message":"unrenderable notice: {e}"}}"#)
            })
        } else {
            match notice.level {
                NoticeLevel::Success => notice.message.clone(),
                NoticeLevel::Failure => format!("error: {}", notice.message),
            }
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "[NOTICE]"),
            NoticeLevel::Failure => {
                warn!(step = ?notice.step, message = %notice.message, "[NOTICE]")
            }
        }
        let mut out = std::io::stdout().lock();
        if let Err(e) = write_notice(&mut out, &self.render(notice)) {
            warn!(error = %e, "[NOTICE] could not write notice to stdout");
        }
    }
}

fn write_notice(out: &mut impl Write, rendered: &str) -> std::io::Result<()> {
    writeln!(out, "{rendered}")?;
    out.flush()
}
