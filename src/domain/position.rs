use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("Invalid balance: {0}")]
    InvalidBalance(Decimal),
    #[error("Invalid entry price: {0}")]
    InvalidEntryPrice(Decimal),
}

/// An open holding tracked by the price monitor.
///
/// Owned exclusively by the monitor's in-memory set; the persisted price
/// store is the durable mirror. Balance is in whole tokens.
#[derive(Debug, Clone)]
pub struct Position {
    pub mint: Pubkey,
    pub initial_price: Decimal,
    pub token_account: Pubkey,
    pub balance: Decimal,
}

impl Position {
    pub fn new(
        mint: Pubkey,
        initial_price: Decimal,
        token_account: Pubkey,
        balance: Decimal,
    ) -> Result<Self, PositionError> {
        if balance <= Decimal::ZERO {
            return Err(PositionError::InvalidBalance(balance));
        }
        if initial_price <= Decimal::ZERO {
            return Err(PositionError::InvalidEntryPrice(initial_price));
        }

        Ok(Self {
            mint,
            initial_price,
            token_account,
            balance,
        })
    }

    /// Price at which the monitor triggers a partial sell.
    pub fn target_price(&self, sell_multiplier: Decimal) -> Decimal {
        self.initial_price * sell_multiplier
    }

    pub fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_position() {
        let position = Position::new(
            Pubkey::new_unique(),
            dec!(0.01),
            Pubkey::new_unique(),
            dec!(35000),
        )
        .unwrap();
        assert_eq!(position.initial_price, dec!(0.01));
        assert_eq!(position.balance, dec!(35000));
    }

    #[test]
    fn test_rejects_zero_balance() {
        let result = Position::new(
            Pubkey::new_unique(),
            dec!(0.01),
            Pubkey::new_unique(),
            dec!(0),
        );
        assert_eq!(result.unwrap_err(), PositionError::InvalidBalance(dec!(0)));
    }

    #[test]
    fn test_rejects_zero_price() {
        let result = Position::new(
            Pubkey::new_unique(),
            dec!(0),
            Pubkey::new_unique(),
            dec!(100),
        );
        assert_eq!(result.unwrap_err(), PositionError::InvalidEntryPrice(dec!(0)));
    }

    #[test]
    fn test_target_price() {
        let position = Position::new(
            Pubkey::new_unique(),
            dec!(0.01),
            Pubkey::new_unique(),
            dec!(100),
        )
        .unwrap();
        assert_eq!(position.target_price(dec!(2)), dec!(0.02));
    }
}
