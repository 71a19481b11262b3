//! Submission Router
//!
//! One delivery protocol per channel. The channel is fixed at startup and
//! the router never falls back across channel types: exhausting a relay's
//! internal fallback list is a terminal failure for that trade attempt.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use thiserror::Error;
use tracing::{info, warn};

use super::builder::BuiltTrade;
use crate::adapters::jito::{JitoBundleClient, JitoConfig};
use crate::adapters::nextblock::{self, NextBlockClient};
use crate::adapters::solana::rpc::{SolanaRpc, SolanaRpcError};
use crate::adapters::solana::wallet::WalletManager;
use crate::domain::trade::ErrorKind;

/// How a signed trade leaves the process. Exactly one is active per run.
#[derive(Debug, Clone)]
pub enum SubmissionChannel {
    /// Plain broadcast plus confirmation polling.
    Direct,
    /// Priority relay paid per transaction; the relay's acceptance is the
    /// delivery guarantee.
    TipRelay {
        api_url: String,
        api_key: String,
        fee_lamports: u64,
    },
    /// Atomic tip + trade bundle through the block engines.
    BundleRelay { tip_lamports: u64 },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("transaction reverted on chain: {0}")]
    ExecutionReverted(String),
    #[error("all relay fallbacks rejected the transaction")]
    ChannelExhausted,
    #[error("timed out waiting for confirmation")]
    ConfirmationTimeout,
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::ExecutionReverted(_) => ErrorKind::ExecutionReverted,
            SubmitError::ChannelExhausted => ErrorKind::ChannelExhausted,
            SubmitError::ConfirmationTimeout
            | SubmitError::Signing(_)
            | SubmitError::Serialization(_)
            | SubmitError::Rpc(_) => ErrorKind::Network,
        }
    }
}

impl From<SolanaRpcError> for SubmitError {
    fn from(err: SolanaRpcError) -> Self {
        match err {
            SolanaRpcError::Reverted(message) => SubmitError::ExecutionReverted(message),
            SolanaRpcError::ConfirmationTimeout => SubmitError::ConfirmationTimeout,
            other => SubmitError::Rpc(other.to_string()),
        }
    }
}

/// Confirmation polling bounds for the channels that poll on chain.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

pub struct SubmissionRouter {
    rpc: SolanaRpc,
    wallet: WalletManager,
    channel: SubmissionChannel,
    confirm: ConfirmPolicy,
    nextblock: Option<NextBlockClient>,
    jito: Option<JitoBundleClient>,
    /// Starting offset into the tip-relay fee address list, advanced per
    /// trade so repeated trades spread fees across relay addresses.
    rotation: AtomicUsize,
}

impl SubmissionRouter {
    pub fn new(
        rpc: SolanaRpc,
        wallet: WalletManager,
        channel: SubmissionChannel,
        confirm: ConfirmPolicy,
    ) -> Result<Self, SubmitError> {
        let nextblock = match &channel {
            SubmissionChannel::TipRelay {
                api_url, api_key, ..
            } => Some(
                NextBlockClient::new(api_url.clone(), api_key.clone(), Duration::from_secs(15))
                    .map_err(|e| SubmitError::Rpc(e.to_string()))?,
            ),
            _ => None,
        };

        let jito = match &channel {
            SubmissionChannel::BundleRelay { tip_lamports } => Some(
                JitoBundleClient::new(JitoConfig::default().with_tip(*tip_lamports))
                    .map_err(|e| SubmitError::Rpc(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            rpc,
            wallet,
            channel,
            confirm,
            nextblock,
            jito,
            rotation: AtomicUsize::new(0),
        })
    }

    pub async fn submit(&self, built: &BuiltTrade) -> Result<Signature, SubmitError> {
        match &self.channel {
            SubmissionChannel::Direct => self.submit_direct(built).await,
            SubmissionChannel::TipRelay { fee_lamports, .. } => {
                self.submit_tip_relay(built, *fee_lamports).await
            }
            SubmissionChannel::BundleRelay { .. } => self.submit_bundle(built).await,
        }
    }

    /// Sign, broadcast once, and poll for confirmation at the configured
    /// commitment. A recorded on-chain error is the failure, not the
    /// broadcast.
    async fn submit_direct(&self, built: &BuiltTrade) -> Result<Signature, SubmitError> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let transaction = self.sign(&built.instructions, blockhash)?;

        let signature = self.rpc.send_transaction(&transaction).await?;
        info!(%signature, mint = %built.mint, direction = %built.direction, "broadcast");

        self.rpc
            .confirm_signature(&signature, self.confirm.timeout, self.confirm.poll_interval)
            .await?;
        Ok(signature)
    }

    /// Walk the relay fee addresses from a per-trade offset. The fee
    /// instruction is rebuilt for every attempt since each attempt pays a
    /// different address; the relay's 2xx response is success and no
    /// on-chain confirmation is polled.
    async fn submit_tip_relay(
        &self,
        built: &BuiltTrade,
        fee_lamports: u64,
    ) -> Result<Signature, SubmitError> {
        let Some(client) = self.nextblock.as_ref() else {
            return Err(SubmitError::Rpc("tip relay client not initialized".into()));
        };

        let blockhash = self.rpc.latest_blockhash().await?;
        let start = self.rotation.fetch_add(1, Ordering::Relaxed);

        for fee_address in nextblock::rotated_tip_addresses(start) {
            let mut attempt_instructions = built.instructions.clone();
            attempt_instructions.push(system_instruction::transfer(
                &self.wallet.pubkey(),
                &fee_address,
                fee_lamports,
            ));

            let transaction = self.sign(&attempt_instructions, blockhash)?;
            let encoded = BASE64.encode(serialize_transaction(&transaction)?);

            match client.submit(encoded).await {
                Ok(signature) => {
                    info!(%signature, relay_fee_address = %fee_address, "relay accepted transaction");
                    return signature
                        .parse::<Signature>()
                        .map_err(|e| SubmitError::Rpc(format!("invalid relay signature: {e}")));
                }
                Err(e) => {
                    warn!(relay_fee_address = %fee_address, error = %e, "relay attempt failed");
                }
            }
        }

        Err(SubmitError::ChannelExhausted)
    }

    /// Submit a [tip, trade] bundle to all block engines in parallel.
    /// Relay acceptance is necessary but not sufficient: the trade's own
    /// signature is still confirmed on chain afterwards.
    async fn submit_bundle(&self, built: &BuiltTrade) -> Result<Signature, SubmitError> {
        let Some(jito) = self.jito.as_ref() else {
            return Err(SubmitError::Rpc("bundle relay client not initialized".into()));
        };

        let blockhash = self.rpc.latest_blockhash().await?;

        let trade_tx = self.sign(&built.instructions, blockhash)?;
        let trade_signature = trade_tx.signatures[0];

        let tip_ix = jito.tip_instruction(&self.wallet.pubkey());
        let tip_tx = self.sign(&[tip_ix], blockhash)?;

        let serialized = vec![
            bs58::encode(serialize_transaction(&tip_tx)?).into_string(),
            bs58::encode(serialize_transaction(&trade_tx)?).into_string(),
        ];

        let accepted = jito
            .send_bundle_all(&serialized)
            .await
            .map_err(|e| SubmitError::Rpc(e.to_string()))?;
        if accepted == 0 {
            return Err(SubmitError::ChannelExhausted);
        }
        info!(accepted, %trade_signature, "bundle accepted, awaiting confirmation");

        self.rpc
            .confirm_signature(
                &trade_signature,
                self.confirm.timeout,
                self.confirm.poll_interval,
            )
            .await?;
        Ok(trade_signature)
    }

    fn sign(
        &self,
        instructions: &[solana_sdk::instruction::Instruction],
        blockhash: solana_sdk::hash::Hash,
    ) -> Result<Transaction, SubmitError> {
        self.wallet
            .sign_instructions(instructions, blockhash)
            .map_err(|e| SubmitError::Signing(e.to_string()))
    }
}

fn serialize_transaction(transaction: &Transaction) -> Result<Vec<u8>, SubmitError> {
    bincode::serialize(transaction).map_err(|e| SubmitError::Serialization(e.to_string()))
}
