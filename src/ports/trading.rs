use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use crate::domain::TradeOutcome;

/// The external contract of the trade executor. Both operations always
/// return a value; failures are folded into the outcome so callers in an
/// event loop never have to catch anything.
#[async_trait]
pub trait TradePort: Send + Sync {
    async fn buy(&self, mint: &Pubkey, sol_amount: Decimal, slippage_bps: u32) -> TradeOutcome;

    async fn sell(
        &self,
        mint: &Pubkey,
        token_amount: Decimal,
        min_sol_output: Option<Decimal>,
    ) -> TradeOutcome;
}
