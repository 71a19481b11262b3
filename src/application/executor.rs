//! Trade Executor
//!
//! The outermost boundary of a trade: build the intent, submit it through
//! the configured channel, and fold every failure into a [`TradeOutcome`].
//! Nothing escapes this boundary, so the event loops driving it survive
//! any single bad trade.

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use super::builder::{BuiltTrade, TradeIntentBuilder};
use super::router::SubmissionRouter;
use crate::domain::trade::{TradeOutcome, TradeRequest};
use crate::ports::trading::TradePort;

pub struct TradeExecutor {
    builder: TradeIntentBuilder,
    router: SubmissionRouter,
    /// Slippage applied when a sell has no explicit output floor.
    default_sell_slippage_bps: u32,
}

impl TradeExecutor {
    pub fn new(
        builder: TradeIntentBuilder,
        router: SubmissionRouter,
        default_sell_slippage_bps: u32,
    ) -> Self {
        Self {
            builder,
            router,
            default_sell_slippage_bps,
        }
    }

    async fn execute(&self, request: TradeRequest) -> TradeOutcome {
        let built: BuiltTrade = match self.builder.build(&request).await {
            Ok(built) => built,
            Err(e) => {
                warn!(
                    mint = %request.mint,
                    direction = %request.direction,
                    error = %e,
                    "trade rejected before submission"
                );
                return TradeOutcome::failure(e.kind());
            }
        };

        match self.router.submit(&built).await {
            Ok(signature) => {
                info!(
                    %signature,
                    mint = %request.mint,
                    direction = %request.direction,
                    "trade submitted"
                );
                TradeOutcome::success(signature)
            }
            Err(e) => {
                warn!(
                    mint = %request.mint,
                    direction = %request.direction,
                    error = %e,
                    "trade submission failed"
                );
                TradeOutcome::failure(e.kind())
            }
        }
    }
}

#[async_trait]
impl TradePort for TradeExecutor {
    async fn buy(&self, mint: &Pubkey, sol_amount: Decimal, slippage_bps: u32) -> TradeOutcome {
        self.execute(TradeRequest::buy(*mint, sol_amount, slippage_bps))
            .await
    }

    async fn sell(
        &self,
        mint: &Pubkey,
        token_amount: Decimal,
        min_sol_output: Option<Decimal>,
    ) -> TradeOutcome {
        self.execute(TradeRequest::sell(
            *mint,
            token_amount,
            min_sol_output,
            self.default_sell_slippage_bps,
        ))
        .await
    }
}
