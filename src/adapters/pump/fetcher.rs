//! Bonding-Curve State Fetcher
//!
//! Newly created curve accounts may lag behind on read replicas, so reads
//! retry on a fixed backoff before giving up. Decode failures are a
//! protocol mismatch and are never retried.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::debug;

use crate::domain::{CurveDecodeError, ReserveSnapshot};
use crate::ports::chain::{ChainError, ChainReader};

/// Bounded fixed-backoff retry budget for curve account reads.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("bonding curve account not found after {attempts} attempts")]
    NotFound { attempts: u32 },
    #[error(transparent)]
    Decode(#[from] CurveDecodeError),
    #[error("chain read failed: {0}")]
    Chain(String),
}

/// Reads and decodes the bonding-curve account for a mint.
#[derive(Clone)]
pub struct CurveStateFetcher {
    chain: Arc<dyn ChainReader>,
    policy: RetryPolicy,
}

impl CurveStateFetcher {
    pub fn new(chain: Arc<dyn ChainReader>, policy: RetryPolicy) -> Self {
        Self { chain, policy }
    }

    /// Fetch the current reserve snapshot, retrying a missing account (or
    /// a transient transport error) up to `max_attempts` reads with a
    /// fixed pause between them.
    pub async fn fetch(&self, curve: &Pubkey) -> Result<ReserveSnapshot, FetchError> {
        let mut last_transport_error = None;

        for attempt in 1..=self.policy.max_attempts {
            match self.chain.get_account_data(curve).await {
                Ok(Some(data)) => return Ok(ReserveSnapshot::decode(&data)?),
                Ok(None) => {
                    debug!(%curve, attempt, "curve account not visible yet");
                    last_transport_error = None;
                }
                Err(ChainError::Rpc(message)) => {
                    debug!(%curve, attempt, %message, "curve read failed");
                    last_transport_error = Some(message);
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        match last_transport_error {
            Some(message) => Err(FetchError::Chain(message)),
            None => Err(FetchError::NotFound {
                attempts: self.policy.max_attempts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::MockChain;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    fn sample_snapshot() -> ReserveSnapshot {
        ReserveSnapshot {
            virtual_token_reserves: 1_073_000_000_000_000,
            virtual_sol_reserves: 30_000_000_000,
            real_token_reserves: 793_100_000_000_000,
            real_sol_reserves: 30_000_000_000,
            token_total_supply: 1_000_000_000_000_000,
            complete: false,
        }
    }

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let chain = MockChain::new();
        chain.push_account(Some(sample_snapshot().encode()));

        let fetcher = CurveStateFetcher::new(Arc::new(chain.clone()), fast_policy(5));
        let snapshot = fetcher.fetch(&Pubkey::new_unique()).await.unwrap();

        assert_eq!(snapshot, sample_snapshot());
        assert_eq!(chain.account_call_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_until_account_appears() {
        let chain = MockChain::new();
        // Missing for the first three reads, then visible.
        for _ in 0..3 {
            chain.push_account(None);
        }
        chain.push_account(Some(sample_snapshot().encode()));

        let fetcher = CurveStateFetcher::new(Arc::new(chain.clone()), fast_policy(5));
        let snapshot = fetcher.fetch(&Pubkey::new_unique()).await.unwrap();

        assert_eq!(snapshot, sample_snapshot());
        assert_eq!(chain.account_call_count(), 4);
    }

    #[tokio::test]
    async fn test_not_found_after_exhausting_budget() {
        let chain = MockChain::new();

        let fetcher = CurveStateFetcher::new(Arc::new(chain.clone()), fast_policy(5));
        let err = fetcher.fetch(&Pubkey::new_unique()).await.unwrap_err();

        assert!(matches!(err, FetchError::NotFound { attempts: 5 }));
        assert_eq!(chain.account_call_count(), 5);
    }

    #[tokio::test]
    async fn test_decode_failure_not_retried() {
        let chain = MockChain::new();
        chain.push_account(Some(vec![0u8; 4]));

        let fetcher = CurveStateFetcher::new(Arc::new(chain.clone()), fast_policy(5));
        let err = fetcher.fetch(&Pubkey::new_unique()).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(chain.account_call_count(), 1);
    }
}
