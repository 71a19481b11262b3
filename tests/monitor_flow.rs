//! End-to-end monitor behavior over the mock ports: a tracked position is
//! sold exactly once when its price target is reached, and its persisted
//! price record is pruned when the balance hits zero.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tempfile::tempdir;

use curve_sniper::adapters::pump::fetcher::RetryPolicy;
use curve_sniper::adapters::solana::LogEvent;
use curve_sniper::application::{MonitorSettings, PositionMonitor};
use curve_sniper::domain::curve::ReserveSnapshot;
use curve_sniper::domain::{Position, PriceStore, TradeOutcome};
use curve_sniper::ports::chain::TokenBalance;
use curve_sniper::ports::mocks::{MockChain, MockTrader};

fn retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        delay: Duration::from_millis(1),
    }
}

fn settings() -> MonitorSettings {
    MonitorSettings {
        sell_multiplier: dec!(2),
        sell_ratio: dec!(0.5),
        sell_slippage: dec!(0.05),
    }
}

/// Curve whose one-token sell quote lands near `lamports_per_token / 1e9`
/// SOL.
fn snapshot_with_price_lamports(lamports_per_token: u64) -> ReserveSnapshot {
    let virtual_sol = lamports_per_token * 1_000_000;
    ReserveSnapshot {
        virtual_token_reserves: 1_000_000_000_000,
        virtual_sol_reserves: virtual_sol,
        real_token_reserves: 1_000_000_000_000,
        real_sol_reserves: virtual_sol,
        token_total_supply: 1_000_000_000_000,
        complete: false,
    }
}

fn event_mentioning(mint: &Pubkey) -> LogEvent {
    LogEvent {
        signature: "sig".to_string(),
        logs: vec![
            "Program log: Instruction: Sell".to_string(),
            format!("Program log: {mint}"),
        ],
    }
}

#[tokio::test]
async fn monitor_sells_once_and_closes_position() {
    let dir = tempdir().unwrap();
    let store = PriceStore::new(dir.path().join("prices.json"));

    let mint = Pubkey::new_unique();
    let wallet = Pubkey::new_unique();
    store.insert(&mint.to_string(), dec!(0.01)).unwrap();

    let chain = MockChain::new();
    let trader = MockTrader::new().with_outcome(TradeOutcome::success(Signature::default()));

    let mut monitor = PositionMonitor::new(
        Arc::new(chain.clone()),
        retry_policy(),
        Arc::new(trader.clone()),
        store.clone(),
        settings(),
        wallet,
    );
    monitor.track(
        Position::new(mint, dec!(0.01), Pubkey::new_unique(), dec!(35000)).unwrap(),
    );

    // First event: 1.9x the entry price. No sell.
    chain.push_account(Some(snapshot_with_price_lamports(19_000_000).encode()));
    monitor.handle_event(&event_mentioning(&mint)).await;
    assert!(trader.sell_calls().is_empty());

    // Second event: above 2x. Sells half, wallet balance goes to zero,
    // position closes and the price record is pruned.
    chain.push_account(Some(snapshot_with_price_lamports(21_000_000).encode()));
    monitor.handle_event(&event_mentioning(&mint)).await;

    let sells = trader.sell_calls();
    assert_eq!(sells.len(), 1);
    assert_eq!(sells[0].0, mint);
    assert_eq!(sells[0].1, dec!(17500));

    assert_eq!(monitor.open_positions(), 0);
    assert_eq!(store.get(&mint.to_string()).unwrap(), None);
}

#[tokio::test]
async fn monitor_keeps_partial_position_open() {
    let dir = tempdir().unwrap();
    let store = PriceStore::new(dir.path().join("prices.json"));

    let mint = Pubkey::new_unique();
    let wallet = Pubkey::new_unique();
    store.insert(&mint.to_string(), dec!(0.01)).unwrap();

    let chain = MockChain::new();
    let trader = MockTrader::new().with_outcome(TradeOutcome::success(Signature::default()));

    let mut monitor = PositionMonitor::new(
        Arc::new(chain.clone()),
        retry_policy(),
        Arc::new(trader.clone()),
        store.clone(),
        settings(),
        wallet,
    );
    monitor.track(
        Position::new(mint, dec!(0.01), Pubkey::new_unique(), dec!(35000)).unwrap(),
    );

    chain.push_account(Some(snapshot_with_price_lamports(25_000_000).encode()));
    // Half the balance remains after the partial sell.
    chain.push_balance(
        mint,
        Some(TokenBalance {
            amount_raw: 17_500_000_000,
            decimals: 6,
        }),
    );

    monitor.handle_event(&event_mentioning(&mint)).await;

    assert_eq!(trader.sell_calls().len(), 1);
    assert_eq!(monitor.open_positions(), 1);
    // Record survives until the position fully closes.
    assert_eq!(store.get(&mint.to_string()).unwrap(), Some(dec!(0.01)));
}
