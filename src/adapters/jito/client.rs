//! Jito Bundle Client
//!
//! JSON-RPC `sendBundle` submission fanned out to every configured block
//! engine endpoint; one acceptance is enough for the bundle to be in
//! flight.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use tracing::{debug, warn};

use super::config::{tip_accounts, JitoConfig};
use super::error::JitoError;

/// Bundle submission request (JSON-RPC format).
#[derive(Debug, Clone, Serialize)]
pub struct BundleRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Vec<String>>,
}

impl BundleRequest {
    pub fn new(transactions: Vec<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "sendBundle".to_string(),
            params: vec![transactions],
        }
    }
}

/// JSON-RPC response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Jito block engine client for bundle submission.
#[derive(Debug, Clone)]
pub struct JitoBundleClient {
    config: JitoConfig,
    http: Client,
}

impl JitoBundleClient {
    pub fn new(config: JitoConfig) -> Result<Self, JitoError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JitoError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn tip_lamports(&self) -> u64 {
        self.config.tip_lamports
    }

    /// Transfer the configured tip to a randomly chosen tip account. Goes
    /// into its own transaction ahead of the trade in the bundle.
    pub fn tip_instruction(&self, payer: &Pubkey) -> Instruction {
        let tip_account = tip_accounts::random_tip_account();
        system_instruction::transfer(payer, &tip_account, self.config.tip_lamports)
    }

    /// Submit the serialized bundle to every endpoint in parallel and
    /// return how many accepted it. Individual endpoint failures are
    /// logged, not fatal; zero acceptances is the caller's terminal case.
    pub async fn send_bundle_all(&self, transactions: &[String]) -> Result<usize, JitoError> {
        if transactions.is_empty() {
            return Err(JitoError::InvalidBundle("Bundle cannot be empty".into()));
        }
        if transactions.len() > 5 {
            return Err(JitoError::InvalidBundle(
                "Bundle cannot contain more than 5 transactions".into(),
            ));
        }

        let request = BundleRequest::new(transactions.to_vec());

        let submissions = self
            .config
            .endpoints
            .iter()
            .map(|endpoint| self.send_bundle(endpoint, &request));
        let results = futures::future::join_all(submissions).await;

        let mut accepted = 0;
        for (endpoint, result) in self.config.endpoints.iter().zip(results) {
            match result {
                Ok(bundle_id) => {
                    debug!(%endpoint, %bundle_id, "bundle accepted");
                    accepted += 1;
                }
                Err(e) => warn!(%endpoint, error = %e, "bundle rejected"),
            }
        }

        Ok(accepted)
    }

    /// Submit to one endpoint; returns the bundle id on acceptance.
    async fn send_bundle(
        &self,
        endpoint: &str,
        request: &BundleRequest,
    ) -> Result<String, JitoError> {
        let url = format!("{}/api/v1/bundles", endpoint.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let body = response.text().await?;
        let rpc_response: JsonRpcResponse<String> = serde_json::from_str(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(JitoError::Api {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or(JitoError::Api {
            code: -1,
            message: "No bundle ID in response".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_request_format() {
        let txs = vec!["tx1_base58".to_string(), "tx2_base58".to_string()];
        let request = BundleRequest::new(txs.clone());

        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method, "sendBundle");
        assert_eq!(request.params.len(), 1);
        assert_eq!(request.params[0], txs);
    }

    #[test]
    fn test_bundle_request_json() {
        let request = BundleRequest::new(vec!["abc".to_string()]);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""method":"sendBundle""#));
        assert!(json.contains(r#""params":[["abc"]]"#));
    }

    #[test]
    fn test_tip_instruction_targets_known_account() {
        let client = JitoBundleClient::new(JitoConfig::default()).unwrap();
        let payer = Pubkey::new_unique();
        let ix = client.tip_instruction(&payer);

        assert_eq!(ix.program_id, solana_sdk::system_program::ID);
        assert!(tip_accounts::TIP_ACCOUNTS.contains(&ix.accounts[1].pubkey));
    }

    #[tokio::test]
    async fn test_empty_bundle_rejected() {
        let client = JitoBundleClient::new(JitoConfig::default()).unwrap();
        let result = client.send_bundle_all(&[]).await;
        assert!(matches!(result, Err(JitoError::InvalidBundle(_))));
    }

    #[tokio::test]
    async fn test_oversized_bundle_rejected() {
        let client = JitoBundleClient::new(JitoConfig::default()).unwrap();
        let txs: Vec<String> = (0..6).map(|i| format!("tx{i}")).collect();
        let result = client.send_bundle_all(&txs).await;
        assert!(matches!(result, Err(JitoError::InvalidBundle(_))));
    }

    #[test]
    fn test_json_rpc_response_parsing() {
        let ok: JsonRpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"bundle-id"}"#).unwrap();
        assert_eq!(ok.result.as_deref(), Some("bundle-id"));
        assert!(ok.error.is_none());

        let err: JsonRpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"bad params"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.unwrap().code, -32602);
    }
}
