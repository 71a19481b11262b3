//! Mint Sniper
//!
//! Watches the program-log stream for freshly minted tokens and buys a
//! fixed SOL amount as soon as one appears. Successful buys record the
//! acquisition price for the monitor; failed buys consume an explicit
//! bounded budget so a misconfigured channel cannot loop forever.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::adapters::pump::accounts::bonding_curve_pda;
use crate::adapters::pump::fetcher::{CurveStateFetcher, RetryPolicy};
use crate::adapters::solana::logs::LogEvent;
use crate::domain::PriceStore;
use crate::ports::chain::ChainReader;
use crate::ports::trading::TradePort;

/// Log markers emitted by a pump.fun token creation.
const MINT_MARKERS: [&str; 2] = ["MintTo", "Instruction: InitializeMint2"];

#[derive(Debug, Clone)]
pub struct SniperSettings {
    pub buy_amount_sol: Decimal,
    pub slippage_bps: u32,
    /// Consecutive failed buys tolerated before the sniper stops.
    pub max_failed_buys: u32,
}

pub struct MintSniper {
    chain: Arc<dyn ChainReader>,
    fetcher: CurveStateFetcher,
    trader: Arc<dyn TradePort>,
    store: PriceStore,
    settings: SniperSettings,
    failed_buys: u32,
}

impl MintSniper {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        retry_policy: RetryPolicy,
        trader: Arc<dyn TradePort>,
        store: PriceStore,
        settings: SniperSettings,
    ) -> Self {
        let fetcher = CurveStateFetcher::new(chain.clone(), retry_policy);
        Self {
            chain,
            fetcher,
            trader,
            store,
            settings,
            failed_buys: 0,
        }
    }

    /// Consume events until the stream closes or the failed-buy budget is
    /// spent.
    pub async fn run(mut self, mut events: mpsc::Receiver<LogEvent>) {
        info!(
            amount = %self.settings.buy_amount_sol,
            max_failed_buys = self.settings.max_failed_buys,
            "mint sniper running"
        );

        while let Some(event) = events.recv().await {
            if !self.handle_event(&event).await {
                return;
            }
        }
        info!("event stream closed, sniper stopping");
    }

    /// Process one log batch. Returns `false` once the failure budget is
    /// exhausted and the sniper should stop.
    pub async fn handle_event(&mut self, event: &LogEvent) -> bool {
        if !is_mint_event(&event.logs) {
            return true;
        }

        let Some(mint) = self.resolve_mint(&event.signature).await else {
            return true;
        };
        info!(%mint, signature = %event.signature, "new token detected");

        let outcome = self
            .trader
            .buy(&mint, self.settings.buy_amount_sol, self.settings.slippage_bps)
            .await;

        if outcome.succeeded {
            self.failed_buys = 0;
            info!(%mint, signature = ?outcome.signature, "buy succeeded");
            self.record_entry_price(&mint).await;
            true
        } else {
            self.failed_buys += 1;
            warn!(
                %mint,
                reason = ?outcome.failure_reason,
                failed = self.failed_buys,
                budget = self.settings.max_failed_buys,
                "buy failed"
            );
            if self.failed_buys >= self.settings.max_failed_buys {
                error!("failed-buy budget exhausted, sniper stopping");
                return false;
            }
            true
        }
    }

    /// The mint of a pump.fun create transaction is the second account
    /// key (index 1, after the payer).
    async fn resolve_mint(&self, signature: &str) -> Option<Pubkey> {
        match self.chain.transaction_account_keys(signature).await {
            Ok(keys) => keys.get(1).and_then(|key| Pubkey::from_str(key).ok()),
            Err(e) => {
                debug!(signature, error = %e, "could not resolve mint");
                None
            }
        }
    }

    /// Persist the per-token price right after the buy so the monitor has
    /// a sound baseline for its multiplier comparison.
    async fn record_entry_price(&self, mint: &Pubkey) {
        let curve = bonding_curve_pda(mint);
        match self.fetcher.fetch(&curve).await {
            Ok(snapshot) => {
                let price = snapshot.price_per_token();
                if let Err(e) = self.store.insert(&mint.to_string(), price) {
                    warn!(%mint, error = %e, "failed to persist entry price");
                }
            }
            Err(e) => warn!(%mint, error = %e, "could not quote entry price"),
        }
    }
}

fn is_mint_event(logs: &[String]) -> bool {
    logs.iter()
        .any(|line| MINT_MARKERS.iter().any(|marker| line.contains(marker)))
}
