//! Program Log Subscription
//!
//! Streams decoded log batches for one program into a bounded, ordered
//! channel. The consumer sees events strictly in arrival order on its own
//! single task, so at most one handler runs at a time.

use std::time::Duration;

use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Reconnection delay base (exponential backoff)
const RECONNECT_BASE_DELAY_MS: u64 = 1000;
/// Maximum reconnection delay
const MAX_RECONNECT_DELAY_MS: u64 = 30_000;

/// One block of program logs from a successful transaction.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub signature: String,
    pub logs: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LogStreamError {
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Subscription failed: {0}")]
    SubscribeFailed(String),
    #[error("Max reconnect attempts ({0}) exceeded")]
    ReconnectsExhausted(u32),
}

/// Subscribes to `logsSubscribe` filtered to one program and forwards
/// events into a channel, reconnecting with capped exponential backoff.
pub struct LogSubscriber {
    ws_url: String,
    program: Pubkey,
    commitment: CommitmentConfig,
    /// 0 = unlimited
    max_reconnect_attempts: u32,
}

impl LogSubscriber {
    pub fn new(ws_url: String, program: Pubkey, commitment: CommitmentConfig) -> Self {
        Self {
            ws_url,
            program,
            commitment,
            max_reconnect_attempts: 0,
        }
    }

    pub fn with_max_reconnects(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Run until the receiving side hangs up. Returns an error only when
    /// the reconnect budget is exhausted.
    pub async fn run(self, events: mpsc::Sender<LogEvent>) -> Result<(), LogStreamError> {
        let mut reconnect_attempts = 0u32;

        loop {
            match self.connect_and_stream(&events).await {
                Ok(()) => {
                    info!("log subscription closed, receiver dropped");
                    return Ok(());
                }
                Err(e) => warn!("log stream error: {e}"),
            }

            if self.max_reconnect_attempts > 0
                && reconnect_attempts >= self.max_reconnect_attempts
            {
                return Err(LogStreamError::ReconnectsExhausted(
                    self.max_reconnect_attempts,
                ));
            }

            reconnect_attempts += 1;
            let delay_ms = std::cmp::min(
                RECONNECT_BASE_DELAY_MS * 2u64.pow(reconnect_attempts.min(10)),
                MAX_RECONNECT_DELAY_MS,
            );
            warn!(
                "reconnecting log stream in {}ms (attempt {})",
                delay_ms, reconnect_attempts
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    /// Returns `Ok(())` when the receiver hung up, `Err` on disconnect.
    async fn connect_and_stream(
        &self,
        events: &mpsc::Sender<LogEvent>,
    ) -> Result<(), LogStreamError> {
        let client = PubsubClient::new(&self.ws_url)
            .await
            .map_err(|e| LogStreamError::ConnectionFailed(e.to_string()))?;

        let (mut stream, _unsubscribe) = client
            .logs_subscribe(
                RpcTransactionLogsFilter::Mentions(vec![self.program.to_string()]),
                RpcTransactionLogsConfig {
                    commitment: Some(self.commitment),
                },
            )
            .await
            .map_err(|e| LogStreamError::SubscribeFailed(e.to_string()))?;

        info!(program = %self.program, url = %self.ws_url, "subscribed to program logs");

        while let Some(response) = stream.next().await {
            let value = response.value;
            if value.err.is_some() {
                // Failed transactions carry no actionable state.
                continue;
            }

            debug!(signature = %value.signature, "log event");
            let event = LogEvent {
                signature: value.signature,
                logs: value.logs,
            };
            if events.send(event).await.is_err() {
                return Ok(());
            }
        }

        Err(LogStreamError::ConnectionFailed(
            "log stream ended".to_string(),
        ))
    }
}
