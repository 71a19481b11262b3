use std::fs;
use std::path::Path;

use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("Invalid base58 private key: {0}")]
    InvalidBase58(String),
}

/// The bot's single signing key.
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array format).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read file: {e}")))?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {e}")))?;

        Self::from_bytes(&bytes)
    }

    /// Load keypair from a base58-encoded secret key string.
    pub fn from_base58(encoded: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| WalletError::InvalidBase58(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Create a new random keypair (for testing).
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Build and sign a transaction paying fees from this wallet.
    pub fn sign_instructions(
        &self,
        instructions: &[Instruction],
        blockhash: Hash,
    ) -> Result<Transaction, WalletError> {
        let mut transaction = Transaction::new_with_payer(instructions, Some(&self.pubkey()));
        transaction
            .try_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::SigningError(e.to_string()))?;
        Ok(transaction)
    }
}

// Clone by round-tripping through the key bytes.
impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: Keypair::try_from(&self.keypair.to_bytes()[..])
                .expect("keypair bytes round-trip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_instruction;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_random_wallet() {
        let wallet = WalletManager::new_random();
        assert_eq!(wallet.pubkey().to_string().len(), 44);
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = WalletManager::from_bytes(&wallet1.keypair.to_bytes()).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }

    #[test]
    fn test_from_base58() {
        let wallet1 = WalletManager::new_random();
        let encoded = bs58::encode(wallet1.keypair.to_bytes()).into_string();
        let wallet2 = WalletManager::from_base58(&encoded).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }

    #[test]
    fn test_from_base58_invalid() {
        assert!(matches!(
            WalletManager::from_base58("not base58 0OIl"),
            Err(WalletError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let wallet1 = WalletManager::new_random();
        let json = serde_json::to_string(&wallet1.keypair.to_bytes().to_vec()).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let wallet2 = WalletManager::from_file(temp_file.path()).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(WalletManager::from_bytes(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_sign_instructions() {
        let wallet = WalletManager::new_random();
        let transfer =
            system_instruction::transfer(&wallet.pubkey(), &Pubkey::new_unique(), 1_000);

        let tx = wallet
            .sign_instructions(&[transfer], Hash::default())
            .unwrap();
        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(tx.message.account_keys[0], wallet.pubkey());
    }

    #[test]
    fn test_clone_wallet() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = wallet1.clone();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }
}
