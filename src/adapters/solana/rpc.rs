use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::{EncodedTransaction, UiMessage, UiTransactionEncoding};
use thiserror::Error;

use crate::ports::chain::{ChainError, ChainReader, TokenBalance};

#[derive(Debug, Error)]
pub enum SolanaRpcError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Transaction reverted on chain: {0}")]
    Reverted(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Timeout waiting for confirmation")]
    ConfirmationTimeout,
}

/// Wrapper around the synchronous Solana RPC client with async-compatible
/// methods (each call runs under `spawn_blocking`).
#[derive(Clone)]
pub struct SolanaRpc {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client, commitment }
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    /// Get SOL balance in lamports.
    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, SolanaRpcError> {
        let client = Arc::clone(&self.client);
        let pubkey = *pubkey;
        tokio::task::spawn_blocking(move || {
            client
                .get_balance(&pubkey)
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }

    /// Raw account bytes at the configured commitment. A missing account
    /// is `Ok(None)`, not an error, so callers can retry on replica lag.
    pub async fn get_account_bytes(
        &self,
        address: &Pubkey,
    ) -> Result<Option<Vec<u8>>, SolanaRpcError> {
        let client = Arc::clone(&self.client);
        let commitment = self.commitment;
        let address = *address;
        tokio::task::spawn_blocking(move || {
            client
                .get_account_with_commitment(&address, commitment)
                .map(|response| response.value.map(|account| account.data))
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }

    /// The owner's balance for a mint, read from the largest (first)
    /// token account. `Ok(None)` when no token account exists.
    pub async fn get_token_balance_for_mint(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Option<TokenBalance>, SolanaRpcError> {
        let client = Arc::clone(&self.client);
        let owner = *owner;
        let mint = *mint;
        tokio::task::spawn_blocking(move || {
            let accounts = client
                .get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))?;

            let Some(keyed) = accounts.into_iter().next() else {
                return Ok(None);
            };

            let token_account = Pubkey::from_str(&keyed.pubkey)
                .map_err(|e| SolanaRpcError::RpcError(format!("Invalid account key: {e}")))?;

            let balance = client
                .get_token_account_balance(&token_account)
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))?;

            let amount_raw = balance
                .amount
                .parse::<u64>()
                .map_err(|e| SolanaRpcError::RpcError(format!("Parse error: {e}")))?;

            Ok(Some(TokenBalance {
                amount_raw,
                decimals: balance.decimals,
            }))
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }

    /// Recent blockhash for transaction building.
    pub async fn latest_blockhash(&self) -> Result<Hash, SolanaRpcError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_latest_blockhash()
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }

    /// Broadcast a signed transaction once, without waiting for
    /// confirmation.
    pub async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaRpcError> {
        let client = Arc::clone(&self.client);
        let tx = transaction.clone();
        tokio::task::spawn_blocking(move || {
            client
                .send_transaction(&tx)
                .map_err(|e| SolanaRpcError::TransactionError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }

    /// Poll a signature until it reaches the configured commitment.
    ///
    /// A recorded on-chain error surfaces as [`SolanaRpcError::Reverted`];
    /// running out of `timeout` surfaces as `ConfirmationTimeout`.
    pub async fn confirm_signature(
        &self,
        signature: &Signature,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), SolanaRpcError> {
        let started = Instant::now();

        loop {
            let client = Arc::clone(&self.client);
            let commitment = self.commitment;
            let signature = *signature;
            let status = tokio::task::spawn_blocking(move || {
                client
                    .get_signature_status_with_commitment(&signature, commitment)
                    .map_err(|e| SolanaRpcError::RpcError(e.to_string()))
            })
            .await
            .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))??;

            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => return Err(SolanaRpcError::Reverted(e.to_string())),
                None => {
                    if started.elapsed() > timeout {
                        return Err(SolanaRpcError::ConfirmationTimeout);
                    }
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    /// Account keys of a confirmed transaction in message order. Used to
    /// resolve the mint of a freshly created token (key index 1).
    pub async fn transaction_account_keys(
        &self,
        signature: &str,
    ) -> Result<Vec<String>, SolanaRpcError> {
        let signature = Signature::from_str(signature)
            .map_err(|e| SolanaRpcError::InvalidSignature(e.to_string()))?;

        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let tx = client
                .get_transaction(&signature, UiTransactionEncoding::Json)
                .map_err(|e| SolanaRpcError::RpcError(e.to_string()))?;

            match tx.transaction.transaction {
                EncodedTransaction::Json(ui_tx) => match ui_tx.message {
                    UiMessage::Raw(message) => Ok(message.account_keys),
                    UiMessage::Parsed(message) => Ok(message
                        .account_keys
                        .into_iter()
                        .map(|account| account.pubkey)
                        .collect()),
                },
                _ => Err(SolanaRpcError::RpcError(
                    "unexpected transaction encoding".to_string(),
                )),
            }
        })
        .await
        .map_err(|e| SolanaRpcError::RpcError(format!("Task join error: {e}")))?
    }
}

#[async_trait]
impl ChainReader for SolanaRpc {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ChainError> {
        self.get_account_bytes(address)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn get_token_balance(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Option<TokenBalance>, ChainError> {
        self.get_token_balance_for_mint(owner, mint)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn transaction_account_keys(&self, signature: &str) -> Result<Vec<String>, ChainError> {
        SolanaRpc::transaction_account_keys(self, signature)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}
