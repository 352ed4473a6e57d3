use anyhow::Result;
use clap::Parser;
use dex_swap_client::{
    cli::{Cli, Commands},
    config::{AppConfig, WalletConfig},
    errors::SwapError,
    models::{CreatePoolRequest, SwapForm, TokenHandle},
    notify::{ConsoleNotifier, Notice, Notifier},
    swap::{SwapOrchestrator, admin},
    utils,
    wallet::{self, WalletProvider, local::LocalKeyWallet},
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    utils::init_logging();
    let cli = Cli::parse();
    let notifier = ConsoleNotifier { json: cli.json };

    // Configuration
    let mut config = AppConfig::load()?;
    config.auto_approve |= cli.yes;
    tracing::info!(
        swapper = ?config.swapper_address,
        rpc = %config.rpc_url,
        decimals = config.token_decimals,
        "[INIT] dex-swap starting"
    );

    // Wallet session: one connection attempt, no retry
    let local = LocalKeyWallet::discover(&WalletConfig::load(), &config).await?;
    let provider = local.as_ref().map(|w| w as &dyn WalletProvider);
    let session = match wallet::connect(provider).await {
        Ok(session) => session,
        Err(err) => {
            notifier.notify(&Notice::failure(&err));
            return Ok(ExitCode::FAILURE);
        }
    };
    let orchestrator_config = config.orchestrator();

    let notice = match cli.command {
        Commands::Account => match session.account() {
            Some(account) => Notice::connected(account),
            None => Notice::failure(&SwapError::NotConnected),
        },
        Commands::Swap(args) => match SwapForm::from(args).into_request() {
            Ok(request) => {
                let orchestrator = SwapOrchestrator::new(session, orchestrator_config);
                let outcome = orchestrator.execute_swap(&request).await;
                Notice::from_swap(&outcome, config.token_decimals)
            }
            Err(err) => Notice::failure(&err),
        },
        Commands::AddToken { token } => match token.parse::<TokenHandle>() {
            Ok(token) => {
                let result = admin::add_token(&session, &orchestrator_config, token).await;
                Notice::from_add_token(token, &result)
            }
            Err(err) => Notice::failure(&err),
        },
        Commands::CreatePool(args) => {
            let result = match CreatePoolRequest::try_from(args) {
                Ok(request) => admin::create_pool(&session, &orchestrator_config, &request).await,
                Err(err) => Err(err),
            };
            Notice::from_create_pool(&result)
        }
    };

    notifier.notify(&notice);
    Ok(if notice.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
