//! Command-line interface definitions.

use crate::errors::SwapError;
use crate::models::{CreatePoolRequest, SwapForm};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dex-swap")]
#[command(about = "Approve two tokens and swap them through a swapper contract")]
#[command(version)]
pub struct Cli {
    /// Answer every wallet prompt with yes.
    #[arg(long, global = true)]
    pub yes: bool,

    /// Print notices as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Approve both tokens and swap token0 into the pair's pool
    Swap(SwapArgs),

    /// Allow a token on the swapper (contract owner only)
    AddToken {
        /// Token contract address
        token: String,
    },

    /// Approve both tokens and create a pool for the pair
    CreatePool(CreatePoolArgs),

    /// Connect the wallet and print the account
    Account,
}

/// Raw values, read as strings and validated only when the action runs.
#[derive(Args, Debug, Clone)]
pub struct SwapArgs {
    #[arg(long)]
    pub token0: String,
    #[arg(long)]
    pub token1: String,
    #[arg(long, allow_hyphen_values = true)]
    pub amount0: String,
    #[arg(long, allow_hyphen_values = true)]
    pub amount1: String,
}

impl From<SwapArgs> for SwapForm {
    fn from(args: SwapArgs) -> Self {
        SwapForm {
            token0: args.token0,
            token1: args.token1,
            amount0: args.amount0,
            amount1: args.amount1,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CreatePoolArgs {
    #[command(flatten)]
    pub pair: SwapArgs,
    /// Fee passed to the contract as a plain integer
    #[arg(long)]
    pub swap_fee: String,
}

impl TryFrom<CreatePoolArgs> for CreatePoolRequest {
    type Error = SwapError;

    fn try_from(args: CreatePoolArgs) -> Result<Self, Self::Error> {
        let pair = SwapForm::from(args.pair).into_request()?;
        Ok(CreatePoolRequest {
            token0: pair.token0,
            token1: pair.token1,
            amount0: pair.amount0,
            amount1: pair.amount1,
            swap_fee: args.swap_fee,
        })
    }
}
