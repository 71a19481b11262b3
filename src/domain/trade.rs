//! Trade Types
//!
//! Request/outcome value types shared by the builder, router, executor and
//! monitor, plus the flattened failure taxonomy surfaced to callers.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

/// SOL carries 9 decimal places on chain.
pub const SOL_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// A single trade to be built and submitted.
///
/// `principal` is SOL for buys and whole tokens for sells. Constructed per
/// call and never shared across concurrent trades.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub mint: Pubkey,
    pub direction: TradeDirection,
    pub principal: Decimal,
    pub slippage_bps: u32,
    /// Sell floor in SOL; when absent a slippage-derived floor is used.
    pub min_output_override: Option<Decimal>,
}

impl TradeRequest {
    pub fn buy(mint: Pubkey, sol_amount: Decimal, slippage_bps: u32) -> Self {
        Self {
            mint,
            direction: TradeDirection::Buy,
            principal: sol_amount,
            slippage_bps,
            min_output_override: None,
        }
    }

    pub fn sell(
        mint: Pubkey,
        token_amount: Decimal,
        min_sol_output: Option<Decimal>,
        slippage_bps: u32,
    ) -> Self {
        Self {
            mint,
            direction: TradeDirection::Sell,
            principal: token_amount,
            slippage_bps,
            min_output_override: min_sol_output,
        }
    }
}

/// Flattened failure classification carried in a [`TradeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Curve account absent after the bounded retry budget.
    CurveNotFound,
    /// Curve is exhausted; buys are no longer valid.
    CurveCompleted,
    InsufficientBalance,
    NoTokenAccount,
    /// Non-zero request truncated to zero base units.
    AmountTooSmall,
    /// Malformed curve account bytes; protocol mismatch.
    DecodeError,
    /// The on-chain program rejected the instruction.
    ExecutionReverted,
    /// Every relay fallback within the channel failed.
    ChannelExhausted,
    /// Transport-level failure (RPC or HTTP).
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::CurveNotFound => "curve account not found",
            ErrorKind::CurveCompleted => "curve completed",
            ErrorKind::InsufficientBalance => "insufficient balance",
            ErrorKind::NoTokenAccount => "no token account",
            ErrorKind::AmountTooSmall => "amount too small",
            ErrorKind::DecodeError => "account decode failed",
            ErrorKind::ExecutionReverted => "execution reverted",
            ErrorKind::ChannelExhausted => "delivery channel exhausted",
            ErrorKind::Network => "network error",
        };
        write!(f, "{label}")
    }
}

/// What a caller gets back from the executor, success or not. The executor
/// never raises past its boundary so event loops driving it cannot be
/// killed by a single bad trade.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub signature: Option<Signature>,
    pub succeeded: bool,
    pub failure_reason: Option<ErrorKind>,
}

impl TradeOutcome {
    pub fn success(signature: Signature) -> Self {
        Self {
            signature: Some(signature),
            succeeded: true,
            failure_reason: None,
        }
    }

    pub fn failure(reason: ErrorKind) -> Self {
        Self {
            signature: None,
            succeeded: false,
            failure_reason: Some(reason),
        }
    }
}

/// Convert a decimal amount to integer base units, truncating toward zero.
///
/// Returns `None` when the amount is negative or does not fit in u64.
/// A non-zero amount that truncates to zero maps to `Some(0)`; callers
/// that must not silently drop dust treat that as an error.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<u64> {
    if amount < Decimal::ZERO {
        return None;
    }
    let scale = Decimal::from(10u64.checked_pow(decimals as u32)?);
    amount.checked_mul(scale)?.trunc().to_u64()
}

/// Convenience wrapper for SOL -> lamports.
pub fn sol_to_lamports(amount: Decimal) -> Option<u64> {
    to_base_units(amount, SOL_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(1), 9), Some(1_000_000_000));
        assert_eq!(to_base_units(dec!(0.5), 6), Some(500_000));
        assert_eq!(to_base_units(dec!(0.1234567891), 9), Some(123_456_789));
        assert_eq!(to_base_units(dec!(0), 9), Some(0));
        assert_eq!(to_base_units(dec!(-1), 9), None);
    }

    #[test]
    fn test_dust_truncates_to_zero() {
        assert_eq!(to_base_units(dec!(0.0000000001), 9), Some(0));
    }

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(sol_to_lamports(dec!(0.001)), Some(1_000_000));
        assert_eq!(sol_to_lamports(dec!(2.5)), Some(2_500_000_000));
    }

    #[test]
    fn test_outcome_constructors() {
        let outcome = TradeOutcome::failure(ErrorKind::CurveCompleted);
        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure_reason, Some(ErrorKind::CurveCompleted));
        assert!(outcome.signature.is_none());

        let outcome = TradeOutcome::success(Signature::default());
        assert!(outcome.succeeded);
        assert!(outcome.failure_reason.is_none());
    }

    #[test]
    fn test_request_constructors() {
        let mint = Pubkey::new_unique();
        let buy = TradeRequest::buy(mint, dec!(0.1), 100);
        assert_eq!(buy.direction, TradeDirection::Buy);
        assert!(buy.min_output_override.is_none());

        let sell = TradeRequest::sell(mint, dec!(1000), Some(dec!(0.02)), 500);
        assert_eq!(sell.direction, TradeDirection::Sell);
        assert_eq!(sell.min_output_override, Some(dec!(0.02)));
    }
}
