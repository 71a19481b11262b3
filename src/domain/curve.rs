//! Bonding Curve State
//!
//! Typed snapshot of a pump.fun bonding-curve account with an explicit
//! decoder that fails loudly on unexpected layouts.

use rust_decimal::Decimal;
use thiserror::Error;

use super::pricing;

/// Anchor account discriminator for the bonding-curve account.
pub const CURVE_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

/// Serialized length: discriminator + five u64 fields + completion flag.
pub const CURVE_ACCOUNT_LEN: usize = 8 + 5 * 8 + 1;

/// Pump.fun tokens are minted with 6 decimals.
pub const TOKEN_DECIMALS: u8 = 6;

/// Base units in one whole token.
pub const ONE_TOKEN: u64 = 1_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveDecodeError {
    #[error("bonding curve account too short: {len} bytes, expected {expected}")]
    TooShort { len: usize, expected: usize },
    #[error("unexpected account discriminator {found:?}")]
    BadDiscriminator { found: [u8; 8] },
}

/// Immutable view of the bonding curve reserves at one point in time.
///
/// Virtual reserves carry the initial liquidity offset used only for
/// pricing; real reserves are the spendable balances that clamp outputs.
/// `complete` means the curve is exhausted and buys are no longer valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

impl ReserveSnapshot {
    /// Decode the raw account bytes.
    ///
    /// Layout: 8-byte Anchor discriminator, then five little-endian u64
    /// fields (virtual token, virtual SOL, real token, real SOL, total
    /// supply), then one completion-flag byte.
    pub fn decode(data: &[u8]) -> Result<Self, CurveDecodeError> {
        if data.len() < CURVE_ACCOUNT_LEN {
            return Err(CurveDecodeError::TooShort {
                len: data.len(),
                expected: CURVE_ACCOUNT_LEN,
            });
        }

        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&data[..8]);
        if discriminator != CURVE_DISCRIMINATOR {
            return Err(CurveDecodeError::BadDiscriminator {
                found: discriminator,
            });
        }

        Ok(Self {
            virtual_token_reserves: read_u64(data, 8),
            virtual_sol_reserves: read_u64(data, 16),
            real_token_reserves: read_u64(data, 24),
            real_sol_reserves: read_u64(data, 32),
            token_total_supply: read_u64(data, 40),
            complete: data[48] != 0,
        })
    }

    /// Encode back into the account wire format (round-trip aid for tests
    /// and simulators).
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(CURVE_ACCOUNT_LEN);
        data.extend_from_slice(&CURVE_DISCRIMINATOR);
        data.extend_from_slice(&self.virtual_token_reserves.to_le_bytes());
        data.extend_from_slice(&self.virtual_sol_reserves.to_le_bytes());
        data.extend_from_slice(&self.real_token_reserves.to_le_bytes());
        data.extend_from_slice(&self.real_sol_reserves.to_le_bytes());
        data.extend_from_slice(&self.token_total_supply.to_le_bytes());
        data.push(self.complete as u8);
        data
    }

    /// Current price of one whole token in SOL, derived from the sell
    /// quote for exactly one token.
    pub fn price_per_token(&self) -> Decimal {
        let lamports = pricing::quote_sell(ONE_TOKEN, self);
        // Lamports fit i64 comfortably (sub-1-SOL per token in practice).
        Decimal::new(lamports as i64, 9)
    }
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
