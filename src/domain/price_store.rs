//! Entry-Price Store
//!
//! Durable mapping from mint address to the price paid at acquisition,
//! kept as a JSON file. Written after every buy, pruned after a position
//! is fully closed, and read once at monitor startup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read price file: {0}")]
    ReadError(String),
    #[error("Failed to write price file: {0}")]
    WriteError(String),
    #[error("Price file is corrupted: {0}")]
    ParseError(String),
    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

#[derive(Debug, Clone)]
pub struct PriceStore {
    path: PathBuf,
}

impl PriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all recorded prices. A missing file is an empty map, not an
    /// error; a present-but-unreadable file is.
    pub fn load(&self) -> Result<HashMap<String, Decimal>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::ReadError(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::ParseError(e.to_string()))
    }

    pub fn get(&self, mint: &str) -> Result<Option<Decimal>, StoreError> {
        Ok(self.load()?.get(mint).copied())
    }

    /// Record (or overwrite) the entry price for a mint.
    pub fn insert(&self, mint: &str, price: Decimal) -> Result<(), StoreError> {
        let mut prices = self.load()?;
        prices.insert(mint.to_string(), price);
        self.save(&prices)?;
        tracing::info!(mint, %price, "recorded entry price");
        Ok(())
    }

    /// Drop the record for a fully closed position. Removing an absent
    /// mint is a no-op.
    pub fn remove(&self, mint: &str) -> Result<(), StoreError> {
        let mut prices = self.load()?;
        if prices.remove(mint).is_some() {
            self.save(&prices)?;
            tracing::info!(mint, "removed entry price record");
        }
        Ok(())
    }

    fn save(&self, prices: &HashMap<String, Decimal>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(prices)
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        fs::write(&self.path, content).map_err(|e| StoreError::WriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let dir = tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.json"));

        store.insert("MintA", dec!(0.0001)).unwrap();
        store.insert("MintB", dec!(0.05)).unwrap();

        assert_eq!(store.get("MintA").unwrap(), Some(dec!(0.0001)));
        assert_eq!(store.get("MintB").unwrap(), Some(dec!(0.05)));
        assert_eq!(store.get("MintC").unwrap(), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let dir = tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.json"));

        store.insert("MintA", dec!(0.01)).unwrap();
        store.insert("MintA", dec!(0.02)).unwrap();

        let prices = store.load().unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices["MintA"], dec!(0.02));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.json"));

        store.insert("MintA", dec!(0.01)).unwrap();
        store.remove("MintA").unwrap();
        assert_eq!(store.get("MintA").unwrap(), None);

        // Removing again is fine.
        store.remove("MintA").unwrap();
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("data").join("prices.json"));
        store.insert("MintA", dec!(1)).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupted_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, "{ not json").unwrap();

        let store = PriceStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::ParseError(_))));
    }

    #[test]
    fn test_empty_file_is_empty_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, "  \n").unwrap();

        let store = PriceStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }
}
