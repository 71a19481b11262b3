//! Jito Configuration
//!
//! Block engine endpoints and validator tip accounts.

use std::time::Duration;

/// Jito block engine bundle endpoints, geographically distributed.
pub mod endpoints {
    pub const MAINNET: &str = "https://mainnet.block-engine.jito.wtf";
    pub const AMSTERDAM: &str = "https://amsterdam.mainnet.block-engine.jito.wtf";
    pub const FRANKFURT: &str = "https://frankfurt.mainnet.block-engine.jito.wtf";
    pub const NY: &str = "https://ny.mainnet.block-engine.jito.wtf";
    pub const TOKYO: &str = "https://tokyo.mainnet.block-engine.jito.wtf";

    pub const ALL: [&str; 5] = [MAINNET, AMSTERDAM, FRANKFURT, NY, TOKYO];
}

/// Official Jito tip accounts (validators rotate through these).
pub mod tip_accounts {
    use solana_sdk::{pubkey, pubkey::Pubkey};

    pub const TIP_ACCOUNTS: [Pubkey; 8] = [
        pubkey!("96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5"),
        pubkey!("HFqU5x63VTqvQss8hp11i4bVmkdzGZBJLYQ6QwBvp8dx"),
        pubkey!("Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY"),
        pubkey!("ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49"),
        pubkey!("DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh"),
        pubkey!("ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt"),
        pubkey!("DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL"),
        pubkey!("3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT"),
    ];

    /// Pick a random tip account.
    pub fn random_tip_account() -> Pubkey {
        use rand::Rng;
        let idx = rand::thread_rng().gen_range(0..TIP_ACCOUNTS.len());
        TIP_ACCOUNTS[idx]
    }
}

#[derive(Debug, Clone)]
pub struct JitoConfig {
    /// Block engine base URLs the bundle is posted to in parallel.
    pub endpoints: Vec<String>,
    /// Tip paid in the separate tip transaction.
    pub tip_lamports: u64,
    /// Per-endpoint request timeout.
    pub timeout: Duration,
}

impl Default for JitoConfig {
    fn default() -> Self {
        Self {
            endpoints: endpoints::ALL.iter().map(|s| s.to_string()).collect(),
            tip_lamports: 100_000, // 0.0001 SOL
            timeout: Duration::from_secs(30),
        }
    }
}

impl JitoConfig {
    pub fn with_tip(mut self, lamports: u64) -> Self {
        self.tip_lamports = lamports;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JitoConfig::default();
        assert_eq!(config.endpoints.len(), 5);
        assert_eq!(config.tip_lamports, 100_000);
    }

    #[test]
    fn test_builder_methods() {
        let config = JitoConfig::default()
            .with_tip(50_000)
            .with_endpoints(vec![endpoints::NY.to_string()]);
        assert_eq!(config.tip_lamports, 50_000);
        assert_eq!(config.endpoints.len(), 1);
    }

    #[test]
    fn test_random_tip_account() {
        let tip = tip_accounts::random_tip_account();
        assert!(tip_accounts::TIP_ACCOUNTS.contains(&tip));
    }
}
