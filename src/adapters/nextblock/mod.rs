//! NextBlock Tip Relay Client
//!
//! Submits signed transactions to the NextBlock priority relay. Each
//! submission must pay a fixed fee to one of the relay-operated addresses;
//! the router rotates through the list on rejection.

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey, pubkey::Pubkey};
use thiserror::Error;

/// Default submission endpoint (Frankfurt).
pub const DEFAULT_SUBMIT_URL: &str = "https://fra.nextblock.io/api/v2/submit";

/// Relay-operated fee addresses. One transfer per submission attempt, to
/// exactly one of these.
pub const TIP_ADDRESSES: [Pubkey; 8] = [
    pubkey!("NEXTbLoCkB51HpLBLojQfpyVAMorm3zzKg7w9NFdqid"),
    pubkey!("NeXTBLoCKs9F1y5PJS9CKrFNNLU1keHW71rfh7KgA1X"),
    pubkey!("NexTBLockJYZ7QD7p2byrUa6df8ndV2WSd8GkbWqfbb"),
    pubkey!("neXtBLock1LeC67jYd1QdAa32kbVeubsfPNTJC1V5At"),
    pubkey!("nEXTBLockYgngeRmRrjDV31mGSekVPqZoMGhQEZtPVG"),
    pubkey!("nextBLoCkPMgmG8ZgJtABeScP35qLa2AMCNKntAP7Xc"),
    pubkey!("NextbLoCkVtMGcV47JzewQdvBpLqT9TxQFozQkN98pE"),
    pubkey!("NexTbLoCkWykbLuB1NkjXgFWkX9oAtcoagQegygXXA2"),
];

/// Fee addresses in rotation order starting at `start`, wrapping once
/// around the full list.
pub fn rotated_tip_addresses(start: usize) -> Vec<Pubkey> {
    (0..TIP_ADDRESSES.len())
        .map(|i| TIP_ADDRESSES[(start + i) % TIP_ADDRESSES.len()])
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitPayload {
    pub transaction: TransactionContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionContent {
    pub content: String,
}

impl SubmitPayload {
    pub fn new(tx_base64: String) -> Self {
        Self {
            transaction: TransactionContent { content: tx_base64 },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub signature: Option<String>,
}

#[derive(Debug, Error)]
pub enum NextBlockError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Relay rejected transaction (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Relay response missing signature")]
    MissingSignature,
    #[error("Invalid relay response: {0}")]
    InvalidResponse(String),
}

/// Thin HTTP client for the relay's submission endpoint.
#[derive(Debug, Clone)]
pub struct NextBlockClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl NextBlockClient {
    pub fn new(
        api_url: String,
        api_key: String,
        timeout: std::time::Duration,
    ) -> Result<Self, NextBlockError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NextBlockError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url,
            api_key,
        })
    }

    /// Submit one base64-encoded signed transaction. The relay's
    /// acceptance response carries the transaction signature; no on-chain
    /// confirmation is polled for this channel.
    pub async fn submit(&self, tx_base64: String) -> Result<String, NextBlockError> {
        let payload = SubmitPayload::new(tx_base64);

        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("authorization", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NextBlockError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NextBlockError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(NextBlockError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SubmitResponse = serde_json::from_str(&body)
            .map_err(|e| NextBlockError::InvalidResponse(e.to_string()))?;

        parsed.signature.ok_or(NextBlockError::MissingSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = SubmitPayload::new("dHg=".to_string());
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"transaction":{"content":"dHg="}}"#);
    }

    #[test]
    fn test_response_parsing() {
        let parsed: SubmitResponse = serde_json::from_str(r#"{"signature":"abc"}"#).unwrap();
        assert_eq!(parsed.signature.as_deref(), Some("abc"));

        let parsed: SubmitResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(parsed.signature.is_none());
    }

    #[test]
    fn test_rotation_covers_every_address_once() {
        let rotated = rotated_tip_addresses(3);
        assert_eq!(rotated.len(), TIP_ADDRESSES.len());
        assert_eq!(rotated[0], TIP_ADDRESSES[3]);
        assert_eq!(rotated[5], TIP_ADDRESSES[0]);

        let mut sorted = rotated.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), TIP_ADDRESSES.len());
    }

    #[test]
    fn test_rotation_wraps_large_start() {
        assert_eq!(rotated_tip_addresses(11)[0], TIP_ADDRESSES[3]);
    }

    #[test]
    fn test_client_creation() {
        let client = NextBlockClient::new(
            DEFAULT_SUBMIT_URL.to_string(),
            "key".to_string(),
            std::time::Duration::from_secs(10),
        );
        assert!(client.is_ok());
    }
}
