//! Trade Intent Builder
//!
//! Turns a [`TradeRequest`] into a fully specified instruction set: quoted
//! amounts, slippage bounds, compute budget, and (for buys) token account
//! creation. One code path parameterized by direction.

use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::adapters::pump::fetcher::{CurveStateFetcher, FetchError, RetryPolicy};
use crate::adapters::pump::{accounts, instructions};
use crate::domain::curve::ReserveSnapshot;
use crate::domain::pricing::{quote_buy, quote_sell};
use crate::domain::trade::{
    to_base_units, ErrorKind, TradeDirection, TradeRequest, SOL_DECIMALS,
};
use crate::domain::CurveDecodeError;
use crate::ports::chain::{ChainError, ChainReader};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("bonding curve account not found after {attempts} attempts")]
    CurveNotFound { attempts: u32 },
    #[error("bonding curve already completed")]
    CurveCompleted,
    #[error(transparent)]
    Decode(#[from] CurveDecodeError),
    #[error("insufficient token balance: have {have}, need {need}")]
    InsufficientBalance { have: Decimal, need: Decimal },
    #[error("no token account found for mint {0}")]
    NoTokenAccount(Pubkey),
    #[error("amount {0} rounds to zero base units")]
    AmountTooSmall(Decimal),
    #[error("chain read failed: {0}")]
    Chain(String),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::CurveNotFound { .. } => ErrorKind::CurveNotFound,
            BuildError::CurveCompleted => ErrorKind::CurveCompleted,
            BuildError::Decode(_) => ErrorKind::DecodeError,
            BuildError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            BuildError::NoTokenAccount(_) => ErrorKind::NoTokenAccount,
            BuildError::AmountTooSmall(_) => ErrorKind::AmountTooSmall,
            BuildError::Chain(_) => ErrorKind::Network,
        }
    }
}

impl From<FetchError> for BuildError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound { attempts } => BuildError::CurveNotFound { attempts },
            FetchError::Decode(e) => BuildError::Decode(e),
            FetchError::Chain(message) => BuildError::Chain(message),
        }
    }
}

impl From<ChainError> for BuildError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rpc(message) => BuildError::Chain(message),
        }
    }
}

/// A ready-to-sign trade: ordered instructions plus the context the router
/// and executor report on.
#[derive(Debug, Clone)]
pub struct BuiltTrade {
    pub mint: Pubkey,
    pub direction: TradeDirection,
    pub instructions: Vec<Instruction>,
}

/// Fixed transaction parameters attached to every trade.
#[derive(Debug, Clone, Copy)]
pub struct TradeSettings {
    pub compute_unit_limit: u32,
    pub compute_unit_price_micro_lamports: u64,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            compute_unit_limit: 100_000,
            compute_unit_price_micro_lamports: 100_000,
        }
    }
}

pub struct TradeIntentBuilder {
    chain: Arc<dyn ChainReader>,
    fetcher: CurveStateFetcher,
    payer: Pubkey,
    settings: TradeSettings,
}

impl TradeIntentBuilder {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        retry_policy: RetryPolicy,
        payer: Pubkey,
        settings: TradeSettings,
    ) -> Self {
        let fetcher = CurveStateFetcher::new(chain.clone(), retry_policy);
        Self {
            chain,
            fetcher,
            payer,
            settings,
        }
    }

    pub async fn build(&self, request: &TradeRequest) -> Result<BuiltTrade, BuildError> {
        match request.direction {
            TradeDirection::Buy => self.build_buy(request).await,
            TradeDirection::Sell => self.build_sell(request).await,
        }
    }

    async fn build_buy(&self, request: &TradeRequest) -> Result<BuiltTrade, BuildError> {
        let snapshot = self.fetch_snapshot(&request.mint).await?;
        if snapshot.complete {
            return Err(BuildError::CurveCompleted);
        }

        let lamports_in = principal_base_units(request.principal, SOL_DECIMALS)?;
        let tokens_out = quote_buy(lamports_in, &snapshot);
        // Upper bound the trader is willing to pay after adverse movement
        // between quote and execution.
        let max_sol_cost = with_slippage_up(lamports_in, request.slippage_bps);

        let mut trade_instructions = self.preamble();

        let token_account = accounts::user_token_account(&self.payer, &request.mint);
        if self.chain.get_account_data(&token_account).await?.is_none() {
            trade_instructions.push(instructions::create_user_token_account(
                &self.payer,
                &self.payer,
                &request.mint,
            ));
        }

        trade_instructions.push(instructions::buy(
            &self.payer,
            &request.mint,
            tokens_out,
            max_sol_cost,
        ));

        Ok(BuiltTrade {
            mint: request.mint,
            direction: TradeDirection::Buy,
            instructions: trade_instructions,
        })
    }

    async fn build_sell(&self, request: &TradeRequest) -> Result<BuiltTrade, BuildError> {
        let balance = self
            .chain
            .get_token_balance(&self.payer, &request.mint)
            .await?
            .ok_or(BuildError::NoTokenAccount(request.mint))?;

        let amount_raw = principal_base_units(request.principal, balance.decimals)?;
        if amount_raw > balance.amount_raw {
            return Err(BuildError::InsufficientBalance {
                have: balance.ui_amount(),
                need: request.principal,
            });
        }

        let snapshot = self.fetch_snapshot(&request.mint).await?;
        let quoted_out = quote_sell(amount_raw, &snapshot);

        let min_sol_output = match request.min_output_override {
            // Caller-specified floor in SOL; zero is a legitimate floor.
            Some(floor) => to_base_units(floor, SOL_DECIMALS).unwrap_or(0),
            None => with_slippage_down(quoted_out, request.slippage_bps),
        };

        let mut trade_instructions = self.preamble();
        trade_instructions.push(instructions::sell(
            &self.payer,
            &request.mint,
            amount_raw,
            min_sol_output,
        ));

        Ok(BuiltTrade {
            mint: request.mint,
            direction: TradeDirection::Sell,
            instructions: trade_instructions,
        })
    }

    async fn fetch_snapshot(&self, mint: &Pubkey) -> Result<ReserveSnapshot, BuildError> {
        let curve = accounts::bonding_curve_pda(mint);
        Ok(self.fetcher.fetch(&curve).await?)
    }

    fn preamble(&self) -> Vec<Instruction> {
        instructions::compute_budget(
            self.settings.compute_unit_limit,
            self.settings.compute_unit_price_micro_lamports,
        )
        .to_vec()
    }
}

/// Convert a user-facing principal to base units, rejecting requests that
/// would silently truncate to nothing.
fn principal_base_units(amount: Decimal, decimals: u8) -> Result<u64, BuildError> {
    match to_base_units(amount, decimals) {
        Some(raw) if raw > 0 => Ok(raw),
        _ => Err(BuildError::AmountTooSmall(amount)),
    }
}

fn with_slippage_up(amount: u64, slippage_bps: u32) -> u64 {
    (amount as u128 + amount as u128 * slippage_bps as u128 / 10_000) as u64
}

fn with_slippage_down(amount: u64, slippage_bps: u32) -> u64 {
    let bps = slippage_bps.min(10_000);
    (amount as u128 * (10_000 - bps) as u128 / 10_000) as u64
}
