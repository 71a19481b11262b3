//! Curve Sniper - Pump.fun bonding-curve sniper and price monitor.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use curve_sniper::adapters::cli::{
    BuyCmd, CliApp, Command, MonitorCmd, RunCmd, SellCmd, StatusCmd,
};
use curve_sniper::adapters::pump::accounts::PUMP_FUN_PROGRAM_ID;
use curve_sniper::adapters::solana::{LogSubscriber, SolanaRpc, WalletManager};
use curve_sniper::application::{
    ConfirmPolicy, MintSniper, PositionMonitor, SubmissionRouter, TradeExecutor,
    TradeIntentBuilder,
};
use curve_sniper::config::{load_config, Config};
use curve_sniper::domain::{PriceStore, TradeOutcome};
use curve_sniper::ports::chain::ChainReader;
use curve_sniper::ports::trading::TradePort;

/// Event channel capacity between the log subscription and the consumers.
const EVENT_BUFFER: usize = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Monitor(cmd) => monitor_command(cmd).await,
        Command::Buy(cmd) => buy_command(cmd).await,
        Command::Sell(cmd) => sell_command(cmd).await,
        Command::Status(cmd) => status_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt().with_env_filter(filter).init();
}

async fn run_command(cmd: RunCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let (rpc, wallet) = connect(&config)?;

    let executor: Arc<dyn TradePort> = Arc::new(build_executor(&config, &rpc, &wallet)?);
    let chain: Arc<dyn ChainReader> = Arc::new(rpc);
    let store = PriceStore::new(config.monitor.price_file.clone());

    let sniper = MintSniper::new(
        chain,
        config.trade.retry_policy(),
        executor,
        store,
        config.sniper.settings(&config.trade),
    );

    let events = spawn_log_subscription(&config);

    tracing::info!("sniper started, watching for new tokens");
    tokio::select! {
        _ = sniper.run(events) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
    }
    Ok(())
}

async fn monitor_command(cmd: MonitorCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let (rpc, wallet) = connect(&config)?;

    let executor: Arc<dyn TradePort> = Arc::new(build_executor(&config, &rpc, &wallet)?);
    let chain: Arc<dyn ChainReader> = Arc::new(rpc);
    let store = PriceStore::new(config.monitor.price_file.clone());

    let mut monitor = PositionMonitor::new(
        chain,
        config.trade.retry_policy(),
        executor,
        store,
        config.monitor.settings(),
        wallet.pubkey(),
    );

    let loaded = monitor
        .load_positions()
        .await
        .map_err(|e| anyhow!("Failed to load price records: {e}"))?;
    if loaded == 0 {
        bail!("No open positions found in {}", config.monitor.price_file);
    }

    let events = spawn_log_subscription(&config);

    tokio::select! {
        _ = monitor.run(events) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
    }
    Ok(())
}

async fn buy_command(cmd: BuyCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let (rpc, wallet) = connect(&config)?;
    let executor = build_executor(&config, &rpc, &wallet)?;

    let mint = Pubkey::from_str(&cmd.mint).context("Invalid mint address")?;
    let amount = cmd.amount.unwrap_or(config.trade.buy_amount_sol);
    let slippage_bps = cmd.slippage_bps.unwrap_or(config.trade.slippage_bps);

    println!("Buying {amount} SOL of {mint}...");
    let outcome = executor.buy(&mint, amount, slippage_bps).await;
    report_outcome(&outcome);
    Ok(())
}

async fn sell_command(cmd: SellCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let (rpc, wallet) = connect(&config)?;
    let executor = build_executor(&config, &rpc, &wallet)?;

    let mint = Pubkey::from_str(&cmd.mint).context("Invalid mint address")?;

    println!("Selling {} of {mint}...", cmd.amount);
    let outcome = executor.sell(&mint, cmd.amount, cmd.min_output).await;
    report_outcome(&outcome);
    Ok(())
}

async fn status_command(cmd: StatusCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let (rpc, wallet) = connect(&config)?;

    let balance = rpc
        .get_balance(&wallet.pubkey())
        .await
        .map_err(|e| anyhow!("Failed to get balance: {e}"))?;

    println!("Wallet: {}", wallet.pubkey());
    println!(
        "Balance: {} lamports ({:.4} SOL)",
        balance,
        balance as f64 / 1e9
    );
    Ok(())
}

fn connect(config: &Config) -> Result<(SolanaRpc, WalletManager)> {
    let commitment = config
        .solana
        .commitment_config()
        .map_err(|e| anyhow!("{e}"))?;
    let rpc = SolanaRpc::new(config.solana.get_rpc_url(), commitment);
    let wallet = load_wallet(config)?;
    Ok((rpc, wallet))
}

fn build_executor(
    config: &Config,
    rpc: &SolanaRpc,
    wallet: &WalletManager,
) -> Result<TradeExecutor> {
    let chain: Arc<dyn ChainReader> = Arc::new(rpc.clone());
    let builder = TradeIntentBuilder::new(
        chain,
        config.trade.retry_policy(),
        wallet.pubkey(),
        config.trade.trade_settings(),
    );

    let channel = config
        .channel
        .submission_channel()
        .map_err(|e| anyhow!("{e}"))?;
    let router = SubmissionRouter::new(
        rpc.clone(),
        wallet.clone(),
        channel,
        ConfirmPolicy::default(),
    )
    .map_err(|e| anyhow!("Failed to set up submission channel: {e}"))?;

    Ok(TradeExecutor::new(
        builder,
        router,
        config.trade.slippage_bps,
    ))
}

/// Start the program-log subscription and hand back the event stream. The
/// subscription task reconnects on its own and dies with the process.
fn spawn_log_subscription(
    config: &Config,
) -> mpsc::Receiver<curve_sniper::adapters::solana::LogEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let subscriber = LogSubscriber::new(
        config.solana.get_ws_url(),
        PUMP_FUN_PROGRAM_ID,
        CommitmentConfig::processed(),
    );

    tokio::spawn(async move {
        if let Err(e) = subscriber.run(tx).await {
            tracing::error!("log subscription terminated: {e}");
        }
    });

    rx
}

/// Load the signing key: a base58 WALLET_PRIVATE_KEY env var wins, then
/// the keypair file from the config.
fn load_wallet(config: &Config) -> Result<WalletManager> {
    if let Ok(encoded) = std::env::var("WALLET_PRIVATE_KEY") {
        return WalletManager::from_base58(&encoded)
            .map_err(|e| anyhow!("Invalid WALLET_PRIVATE_KEY: {e}"));
    }

    let keypair_path = shellexpand::tilde(&config.solana.keypair_path).to_string();
    let path = Path::new(&keypair_path);

    if !path.exists() {
        bail!(
            "Wallet file not found: {}\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or set WALLET_PRIVATE_KEY, or update 'keypair_path' in your config.toml",
            keypair_path,
            keypair_path
        );
    }

    WalletManager::from_file(&keypair_path).map_err(|e| {
        anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             The file exists but may be corrupted or in the wrong format.\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path,
            e
        )
    })
}

fn report_outcome(outcome: &TradeOutcome) {
    if outcome.succeeded {
        if let Some(signature) = &outcome.signature {
            println!("Success: https://solscan.io/tx/{signature}");
        }
    } else if let Some(reason) = &outcome.failure_reason {
        println!("Trade failed: {reason}");
    }
}
