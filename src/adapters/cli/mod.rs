//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "curve-sniper", about = "Pump.fun bonding-curve sniper and price monitor")]
pub struct CliApp {
    /// Info-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug-level logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch for new token mints and buy them as they appear
    Run(RunCmd),
    /// Watch acquired positions and sell once the price target is hit
    Monitor(MonitorCmd),
    /// Buy a token once
    Buy(BuyCmd),
    /// Sell a token once
    Sell(SellCmd),
    /// Show wallet address and SOL balance
    Status(StatusCmd),
}

#[derive(Debug, Args)]
pub struct RunCmd {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Debug, Args)]
pub struct MonitorCmd {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Debug, Args)]
pub struct BuyCmd {
    /// Token mint address
    pub mint: String,

    /// SOL to spend (defaults to the configured buy amount)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Slippage tolerance in basis points
    #[arg(long)]
    pub slippage_bps: Option<u32>,

    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Debug, Args)]
pub struct SellCmd {
    /// Token mint address
    pub mint: String,

    /// Whole tokens to sell
    pub amount: Decimal,

    /// Minimum acceptable output in SOL
    #[arg(long)]
    pub min_output: Option<Decimal>,

    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Debug, Args)]
pub struct StatusCmd {
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}
