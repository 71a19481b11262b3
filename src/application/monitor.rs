//! Position Monitor
//!
//! Watches previously acquired positions over the program-log event
//! stream. When a tracked mint shows up in a log batch, the current
//! per-token price is refetched and compared against the entry price; a
//! configured multiple triggers a partial sell. A single-flight state
//! machine guards the sell path: while one sell is in flight, events for
//! every mint are dropped, mirroring the single-threaded event source.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::adapters::pump::accounts::{bonding_curve_pda, user_token_account};
use crate::adapters::pump::fetcher::{CurveStateFetcher, RetryPolicy};
use crate::adapters::solana::logs::LogEvent;
use crate::domain::price_store::StoreError;
use crate::domain::{Position, PriceStore};
use crate::ports::chain::ChainReader;
use crate::ports::trading::TradePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorState {
    Idle,
    SellInFlight,
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Sell once current price >= initial price * this multiplier.
    pub sell_multiplier: Decimal,
    /// Fraction of the balance sold per trigger, in (0, 1].
    pub sell_ratio: Decimal,
    /// Fractional tolerance applied to the output floor, e.g. 0.05.
    pub sell_slippage: Decimal,
}

pub struct PositionMonitor {
    chain: Arc<dyn ChainReader>,
    fetcher: CurveStateFetcher,
    trader: Arc<dyn TradePort>,
    store: PriceStore,
    settings: MonitorSettings,
    wallet: Pubkey,
    positions: HashMap<Pubkey, Position>,
    state: MonitorState,
}

impl PositionMonitor {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        retry_policy: RetryPolicy,
        trader: Arc<dyn TradePort>,
        store: PriceStore,
        settings: MonitorSettings,
        wallet: Pubkey,
    ) -> Self {
        let fetcher = CurveStateFetcher::new(chain.clone(), retry_policy);
        Self {
            chain,
            fetcher,
            trader,
            store,
            settings,
            wallet,
            positions: HashMap::new(),
            state: MonitorState::Idle,
        }
    }

    /// Seed the tracked set from the persisted price store, skipping mints
    /// the wallet no longer holds. Returns the number of open positions.
    pub async fn load_positions(&mut self) -> Result<usize, StoreError> {
        for (mint_str, initial_price) in self.store.load()? {
            let Ok(mint) = Pubkey::from_str(&mint_str) else {
                warn!(mint = %mint_str, "skipping invalid mint in price file");
                continue;
            };
            if initial_price <= Decimal::ZERO {
                warn!(%mint, %initial_price, "skipping non-positive entry price");
                continue;
            }

            match self.chain.get_token_balance(&self.wallet, &mint).await {
                Ok(Some(balance)) if balance.amount_raw > 0 => {
                    let position = match Position::new(
                        mint,
                        initial_price,
                        user_token_account(&self.wallet, &mint),
                        balance.ui_amount(),
                    ) {
                        Ok(position) => position,
                        Err(e) => {
                            warn!(%mint, error = %e, "skipping position");
                            continue;
                        }
                    };
                    info!(%mint, %initial_price, balance = %position.balance, "tracking position");
                    self.positions.insert(mint, position);
                }
                Ok(_) => debug!(%mint, "no balance held, not tracking"),
                Err(e) => warn!(%mint, error = %e, "balance check failed, not tracking"),
            }
        }

        Ok(self.positions.len())
    }

    /// Seed one position directly (used by tests and recovery paths).
    pub fn track(&mut self, position: Position) {
        self.positions.insert(position.mint, position);
    }

    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    /// Consume events in arrival order until the stream closes or every
    /// position is closed.
    pub async fn run(mut self, mut events: mpsc::Receiver<LogEvent>) {
        info!(
            positions = self.positions.len(),
            multiplier = %self.settings.sell_multiplier,
            ratio = %self.settings.sell_ratio,
            "price monitor running"
        );

        while let Some(event) = events.recv().await {
            self.handle_event(&event).await;
            if self.positions.is_empty() {
                info!("all positions closed, monitor stopping");
                return;
            }
        }
        info!("event stream closed, monitor stopping");
    }

    /// Process one decoded log batch.
    pub async fn handle_event(&mut self, event: &LogEvent) {
        if self.state == MonitorState::SellInFlight {
            // Single flight: drop events for all mints, not just the one
            // being sold.
            return;
        }

        let referenced: Vec<Pubkey> = self
            .positions
            .keys()
            .filter(|mint| {
                let needle = mint.to_string();
                event.logs.iter().any(|line| line.contains(&needle))
            })
            .copied()
            .collect();

        for mint in referenced {
            self.check_position(&mint).await;
        }
    }

    async fn check_position(&mut self, mint: &Pubkey) {
        let Some(position) = self.positions.get(mint) else {
            return;
        };
        if position.balance <= Decimal::ZERO {
            return;
        }

        let curve = bonding_curve_pda(mint);
        let snapshot = match self.fetcher.fetch(&curve).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(%mint, error = %e, "price refresh failed");
                return;
            }
        };

        let current_price = snapshot.price_per_token();
        let target = position.target_price(self.settings.sell_multiplier);
        debug!(%mint, %current_price, initial = %position.initial_price, %target, "price update");

        if current_price < target {
            return;
        }

        info!(%mint, %current_price, %target, "price target reached, selling");
        self.state = MonitorState::SellInFlight;

        let sell_amount = position.balance * self.settings.sell_ratio;
        let min_output = current_price * (Decimal::ONE - self.settings.sell_slippage);
        let outcome = self.trader.sell(mint, sell_amount, Some(min_output)).await;

        if outcome.succeeded {
            self.refresh_after_sell(mint).await;
        } else {
            warn!(
                %mint,
                reason = ?outcome.failure_reason,
                "sell failed, keeping position"
            );
        }

        // Back to idle whatever happened above.
        self.state = MonitorState::Idle;
    }

    /// Re-read the wallet balance after a successful sell; close the
    /// position (and drop its price record) once nothing is left.
    async fn refresh_after_sell(&mut self, mint: &Pubkey) {
        match self.chain.get_token_balance(&self.wallet, mint).await {
            Ok(Some(balance)) if balance.amount_raw > 0 => {
                if let Some(position) = self.positions.get_mut(mint) {
                    position.set_balance(balance.ui_amount());
                    info!(%mint, remaining = %position.balance, "partial sell complete");
                }
            }
            Ok(_) => {
                self.positions.remove(mint);
                if let Err(e) = self.store.remove(&mint.to_string()) {
                    warn!(%mint, error = %e, "failed to prune price record");
                }
                info!(%mint, "position closed");
            }
            Err(e) => {
                warn!(%mint, error = %e, "balance refresh failed, keeping stale balance");
            }
        }
    }
}
