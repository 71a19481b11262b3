//! Recording mocks for the port traits. Each mock keeps a call log behind
//! a mutex and returns scripted responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use super::chain::{ChainError, ChainReader, TokenBalance};
use super::trading::TradePort;
use crate::domain::{ErrorKind, TradeOutcome};

/// Mock chain reader with a scripted queue of account responses and
/// per-mint token balances.
#[derive(Debug, Default, Clone)]
pub struct MockChain {
    account_calls: Arc<Mutex<Vec<Pubkey>>>,
    account_script: Arc<Mutex<VecDeque<Option<Vec<u8>>>>>,
    balance_script: Arc<Mutex<HashMap<Pubkey, VecDeque<Option<TokenBalance>>>>>,
    transaction_keys: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response for `get_account_data`. Once the queue is
    /// drained every further read reports a missing account.
    pub fn push_account(&self, response: Option<Vec<u8>>) {
        self.account_script.lock().unwrap().push_back(response);
    }

    /// Queue the next balance response for a mint. A drained queue reports
    /// no token account.
    pub fn push_balance(&self, mint: Pubkey, response: Option<TokenBalance>) {
        self.balance_script
            .lock()
            .unwrap()
            .entry(mint)
            .or_default()
            .push_back(response);
    }

    pub fn set_transaction_keys(&self, signature: &str, keys: Vec<String>) {
        self.transaction_keys
            .lock()
            .unwrap()
            .insert(signature.to_string(), keys);
    }

    pub fn account_calls(&self) -> Vec<Pubkey> {
        self.account_calls.lock().unwrap().clone()
    }

    pub fn account_call_count(&self) -> usize {
        self.account_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ChainError> {
        self.account_calls.lock().unwrap().push(*address);
        Ok(self
            .account_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(None))
    }

    async fn get_token_balance(
        &self,
        _owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Option<TokenBalance>, ChainError> {
        Ok(self
            .balance_script
            .lock()
            .unwrap()
            .get_mut(mint)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(None))
    }

    async fn transaction_account_keys(&self, signature: &str) -> Result<Vec<String>, ChainError> {
        self.transaction_keys
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("transaction {signature} not found")))
    }
}

/// Mock trade executor recording every buy/sell and returning a scripted
/// outcome.
#[derive(Debug, Clone)]
pub struct MockTrader {
    buy_calls: Arc<Mutex<Vec<(Pubkey, Decimal, u32)>>>,
    sell_calls: Arc<Mutex<Vec<(Pubkey, Decimal, Option<Decimal>)>>>,
    outcome: Arc<Mutex<TradeOutcome>>,
}

impl Default for MockTrader {
    fn default() -> Self {
        Self {
            buy_calls: Arc::new(Mutex::new(Vec::new())),
            sell_calls: Arc::new(Mutex::new(Vec::new())),
            outcome: Arc::new(Mutex::new(TradeOutcome::failure(ErrorKind::Network))),
        }
    }
}

impl MockTrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, outcome: TradeOutcome) -> Self {
        *self.outcome.lock().unwrap() = outcome;
        self
    }

    pub fn set_outcome(&self, outcome: TradeOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn buy_calls(&self) -> Vec<(Pubkey, Decimal, u32)> {
        self.buy_calls.lock().unwrap().clone()
    }

    pub fn sell_calls(&self) -> Vec<(Pubkey, Decimal, Option<Decimal>)> {
        self.sell_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradePort for MockTrader {
    async fn buy(&self, mint: &Pubkey, sol_amount: Decimal, slippage_bps: u32) -> TradeOutcome {
        self.buy_calls
            .lock()
            .unwrap()
            .push((*mint, sol_amount, slippage_bps));
        self.outcome.lock().unwrap().clone()
    }

    async fn sell(
        &self,
        mint: &Pubkey,
        token_amount: Decimal,
        min_sol_output: Option<Decimal>,
    ) -> TradeOutcome {
        self.sell_calls
            .lock()
            .unwrap()
            .push((*mint, token_amount, min_sol_output));
        self.outcome.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use solana_sdk::signature::Signature;

    #[tokio::test]
    async fn test_mock_chain_account_script() {
        let chain = MockChain::new();
        chain.push_account(None);
        chain.push_account(Some(vec![1, 2, 3]));

        let address = Pubkey::new_unique();
        assert_eq!(chain.get_account_data(&address).await.unwrap(), None);
        assert_eq!(
            chain.get_account_data(&address).await.unwrap(),
            Some(vec![1, 2, 3])
        );
        // Drained queue keeps reporting a missing account.
        assert_eq!(chain.get_account_data(&address).await.unwrap(), None);
        assert_eq!(chain.account_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_chain_balances() {
        let chain = MockChain::new();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        chain.push_balance(
            mint,
            Some(TokenBalance {
                amount_raw: 500,
                decimals: 6,
            }),
        );

        let balance = chain.get_token_balance(&owner, &mint).await.unwrap();
        assert_eq!(balance.unwrap().amount_raw, 500);
        assert!(chain
            .get_token_balance(&owner, &mint)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_mock_trader_records_calls() {
        let mint = Pubkey::new_unique();
        let trader = MockTrader::new().with_outcome(TradeOutcome::success(Signature::default()));

        let outcome = trader.sell(&mint, dec!(100), Some(dec!(0.02))).await;
        assert!(outcome.succeeded);
        assert_eq!(trader.sell_calls(), vec![(mint, dec!(100), Some(dec!(0.02)))]);
        assert!(trader.buy_calls().is_empty());
    }
}
