use ethers::types::Address;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Infrastructure failures outside the swap flow itself (config, node access, output).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error(transparent)]
    Swap(#[from] SwapError),
}

/// Stage of a user action, used to name where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Connect,
    ReadForm,
    Submit,
    Bind,
    Normalize,
    ApproveToken0,
    ApproveToken1,
    ResolvePool,
    Swap,
    CreatePool,
    AddToken,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Connect => "connect wallet",
            Step::ReadForm => "read token address",
            Step::Submit => "start swap",
            Step::Bind => "bind contract",
            Step::Normalize => "read amounts",
            Step::ApproveToken0 => "approve token0",
            Step::ApproveToken1 => "approve token1",
            Step::ResolvePool => "resolve pool",
            Step::Swap => "swap",
            Step::CreatePool => "create pool",
            Step::AddToken => "add token",
        };
        f.write_str(label)
    }
}

/// Which side of the pair an approval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Token0,
    Token1,
}

impl Leg {
    pub fn approve_step(self) -> Step {
        match self {
            Leg::Token0 => Step::ApproveToken0,
            Leg::Token1 => Step::ApproveToken1,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Token0 => f.write_str("token0"),
            Leg::Token1 => f.write_str("token1"),
        }
    }
}

/// Terminal failure of a user-triggered action.
///
/// Reasons coming from the chain are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("no wallet provider available")]
    WalletUnavailable,

    #[error("wallet access denied by user")]
    UserDenied,

    #[error("wallet not connected")]
    NotConnected,

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid token address {0:?}")]
    InvalidAddress(String),

    #[error("approval of {leg} ({token:?}) failed: {reason}")]
    ApprovalFailed {
        leg: Leg,
        token: Address,
        reason: String,
    },

    #[error("pool not found for {token0:?}/{token1:?}: {reason}")]
    PoolNotFound {
        token0: Address,
        token1: Address,
        reason: String,
    },

    #[error("swap execution failed: {0}")]
    SwapExecutionFailed(String),

    #[error("create pool failed: {0}")]
    CreatePoolFailed(String),

    #[error("add token failed: {0}")]
    AddTokenFailed(String),

    #[error("{step} not confirmed within {}s", .after.as_secs())]
    TimedOut { step: Step, after: Duration },

    #[error("another swap is already in flight")]
    Busy,
}

impl SwapError {
    pub(crate) fn invalid_amount(input: &str, reason: impl Into<String>) -> Self {
        SwapError::InvalidAmount {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// The step that produced this failure.
    pub fn step(&self) -> Step {
        match self {
            SwapError::WalletUnavailable | SwapError::UserDenied => Step::Connect,
            SwapError::NotConnected => Step::Bind,
            SwapError::InvalidAddress(_) => Step::ReadForm,
            SwapError::Busy => Step::Submit,
            SwapError::InvalidAmount { .. } => Step::Normalize,
            SwapError::ApprovalFailed { leg, .. } => leg.approve_step(),
            SwapError::PoolNotFound { .. } => Step::ResolvePool,
            SwapError::SwapExecutionFailed(_) => Step::Swap,
            SwapError::CreatePoolFailed(_) => Step::CreatePool,
            SwapError::AddTokenFailed(_) => Step::AddToken,
            SwapError::TimedOut { step, .. } => *step,
        }
    }
}
