//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching the
//! config.toml structure. Secrets never live in the file: the relay API
//! key and an optional base58 private key come from the environment.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use thiserror::Error;

use crate::adapters::nextblock;
use crate::adapters::pump::fetcher::RetryPolicy;
use crate::application::builder::TradeSettings;
use crate::application::monitor::MonitorSettings;
use crate::application::router::SubmissionChannel;
use crate::application::sniper::SniperSettings;
use crate::domain::trade::sol_to_lamports;

/// Environment variable holding the tip-relay API key.
pub const NEXTBLOCK_API_KEY_ENV: &str = "NEXTBLOCK_API_KEY";

/// Main configuration structure matching config.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub solana: SolanaSection,
    pub trade: TradeSection,
    pub channel: ChannelSection,
    pub monitor: MonitorSection,
    #[serde(default)]
    pub sniper: SniperSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Solana RPC configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint (use a private RPC for production)
    pub rpc_url: String,
    /// WebSocket endpoint for log subscriptions
    pub ws_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
}

impl SolanaSection {
    /// RPC URL with environment variable override (SOLANA_RPC_URL).
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// WebSocket URL with environment variable override (SOLANA_WS_URL).
    pub fn get_ws_url(&self) -> String {
        std::env::var("SOLANA_WS_URL").unwrap_or_else(|_| self.ws_url.clone())
    }

    pub fn commitment_config(&self) -> Result<CommitmentConfig, ConfigError> {
        match self.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(ConfigError::ValidationError(format!(
                "unknown commitment level '{other}'"
            ))),
        }
    }
}

/// Trade parameter section.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeSection {
    /// SOL spent per sniped buy
    pub buy_amount_sol: Decimal,
    /// Slippage tolerance in basis points
    pub slippage_bps: u32,
    /// Compute unit limit attached ahead of every trade
    pub compute_unit_limit: u32,
    /// Base priority fee in micro-lamports per compute unit
    pub compute_unit_price_micro_lamports: u64,
    /// Bonding-curve read retries (replica lag)
    pub curve_retry_attempts: u32,
    /// Fixed pause between retries in milliseconds
    pub curve_retry_delay_ms: u64,
}

impl TradeSection {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.curve_retry_attempts,
            delay: Duration::from_millis(self.curve_retry_delay_ms),
        }
    }

    pub fn trade_settings(&self) -> TradeSettings {
        TradeSettings {
            compute_unit_limit: self.compute_unit_limit,
            compute_unit_price_micro_lamports: self.compute_unit_price_micro_lamports,
        }
    }
}

/// Delivery channel section. Exactly one channel is active per run.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSection {
    /// "direct", "tip_relay" or "bundle_relay"
    pub mode: String,
    /// Tip relay submission endpoint
    #[serde(default = "default_tip_relay_url")]
    pub tip_relay_url: String,
    /// Fee paid to the relay per submission attempt, in SOL
    #[serde(default = "default_tip_relay_fee")]
    pub tip_relay_fee_sol: Decimal,
    /// Bundle tip, in SOL
    #[serde(default = "default_bundle_tip")]
    pub bundle_tip_sol: Decimal,
}

fn default_tip_relay_url() -> String {
    nextblock::DEFAULT_SUBMIT_URL.to_string()
}

fn default_tip_relay_fee() -> Decimal {
    Decimal::new(1, 3) // 0.001 SOL
}

fn default_bundle_tip() -> Decimal {
    Decimal::new(1, 4) // 0.0001 SOL
}

impl ChannelSection {
    /// Resolve the configured channel, pulling the relay credential from
    /// the environment when the tip relay is selected.
    pub fn submission_channel(&self) -> Result<SubmissionChannel, ConfigError> {
        match self.mode.as_str() {
            "direct" => Ok(SubmissionChannel::Direct),
            "tip_relay" => {
                let api_key = std::env::var(NEXTBLOCK_API_KEY_ENV).map_err(|_| {
                    ConfigError::ValidationError(format!(
                        "{NEXTBLOCK_API_KEY_ENV} must be set for tip_relay mode"
                    ))
                })?;
                let fee_lamports = sol_to_lamports(self.tip_relay_fee_sol).ok_or_else(|| {
                    ConfigError::ValidationError("invalid tip_relay_fee_sol".to_string())
                })?;
                Ok(SubmissionChannel::TipRelay {
                    api_url: self.tip_relay_url.clone(),
                    api_key,
                    fee_lamports,
                })
            }
            "bundle_relay" => {
                let tip_lamports = sol_to_lamports(self.bundle_tip_sol).ok_or_else(|| {
                    ConfigError::ValidationError("invalid bundle_tip_sol".to_string())
                })?;
                Ok(SubmissionChannel::BundleRelay { tip_lamports })
            }
            other => Err(ConfigError::ValidationError(format!(
                "unknown channel mode '{other}'"
            ))),
        }
    }
}

/// Price monitor section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Path of the persisted entry-price file
    pub price_file: String,
    /// Sell once price reaches entry * multiplier
    pub sell_multiplier: Decimal,
    /// Fraction of the balance sold per trigger, in (0, 1]
    pub sell_ratio: Decimal,
    /// Output floor tolerance, e.g. 0.05 for 5%
    pub sell_slippage: Decimal,
}

impl MonitorSection {
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            sell_multiplier: self.sell_multiplier,
            sell_ratio: self.sell_ratio,
            sell_slippage: self.sell_slippage,
        }
    }
}

/// Sniper section.
#[derive(Debug, Clone, Deserialize)]
pub struct SniperSection {
    /// Consecutive failed buys tolerated before the sniper stops
    pub max_failed_buys: u32,
}

impl Default for SniperSection {
    fn default() -> Self {
        Self { max_failed_buys: 3 }
    }
}

impl SniperSection {
    pub fn settings(&self, trade: &TradeSection) -> SniperSettings {
        SniperSettings {
            buy_amount_sol: trade.buy_amount_sol,
            slippage_bps: trade.slippage_bps,
            max_failed_buys: self.max_failed_buys,
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }
        if self.solana.ws_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "ws_url cannot be empty".to_string(),
            ));
        }
        if self.solana.keypair_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "keypair_path cannot be empty".to_string(),
            ));
        }
        self.solana.commitment_config()?;

        if self.trade.buy_amount_sol <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "buy_amount_sol must be > 0, got {}",
                self.trade.buy_amount_sol
            )));
        }
        if self.trade.slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "slippage_bps must be <= 10000, got {}",
                self.trade.slippage_bps
            )));
        }
        if self.trade.curve_retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "curve_retry_attempts must be >= 1".to_string(),
            ));
        }

        match self.channel.mode.as_str() {
            "direct" | "tip_relay" | "bundle_relay" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown channel mode '{other}'"
                )))
            }
        }
        if self.channel.tip_relay_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "tip_relay_url cannot be empty".to_string(),
            ));
        }

        if self.monitor.price_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "price_file cannot be empty".to_string(),
            ));
        }
        if self.monitor.sell_multiplier <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "sell_multiplier must be > 0, got {}",
                self.monitor.sell_multiplier
            )));
        }
        if self.monitor.sell_ratio <= Decimal::ZERO || self.monitor.sell_ratio > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "sell_ratio must be in (0, 1], got {}",
                self.monitor.sell_ratio
            )));
        }
        if self.monitor.sell_slippage < Decimal::ZERO || self.monitor.sell_slippage >= Decimal::ONE
        {
            return Err(ConfigError::ValidationError(format!(
                "sell_slippage must be in [0, 1), got {}",
                self.monitor.sell_slippage
            )));
        }

        if self.sniper.max_failed_buys == 0 {
            return Err(ConfigError::ValidationError(
                "max_failed_buys must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}
