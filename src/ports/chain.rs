use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
}

/// A wallet's holding of one SPL token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub amount_raw: u64,
    pub decimals: u8,
}

impl TokenBalance {
    /// Balance in whole tokens.
    pub fn ui_amount(&self) -> Decimal {
        Decimal::from(self.amount_raw) / Decimal::from(10u64.pow(self.decimals as u32))
    }
}

/// Read-side capability the core depends on but does not implement.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Raw account bytes, or `None` when the account does not exist at the
    /// configured commitment.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ChainError>;

    /// The owner's balance for `mint`, or `None` when no token account
    /// exists.
    async fn get_token_balance(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Option<TokenBalance>, ChainError>;

    /// Account keys of a confirmed transaction, in message order.
    async fn transaction_account_keys(&self, signature: &str) -> Result<Vec<String>, ChainError>;
}
