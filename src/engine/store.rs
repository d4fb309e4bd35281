//! Contracts for the engine's external collaborators, plus in-memory and
//! JSON-file implementations.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::core::{AgentConfiguration, RetentionTransaction, StoreError, TaxType};

/// Persisted agent configuration.
///
/// Writes are last-write-wins; the engine only relies on its own single
/// counter update.
#[async_trait]
pub trait AgentConfigStore: Send + Sync {
    /// Load the current configuration.
    async fn get(&self) -> Result<AgentConfiguration, StoreError>;

    /// Persist the next voucher counter value.
    async fn update_counter(&self, counter: u64) -> Result<(), StoreError>;
}

/// Supplies the ordered retentions to declare for a tax type and period.
///
/// The order returned is the order vouchers are numbered in.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn transactions(
        &self,
        tax_type: TaxType,
        period: &str,
    ) -> Result<Vec<RetentionTransaction>, StoreError>;
}

/// Configuration held in memory.
#[derive(Debug)]
pub struct MemoryConfigStore {
    config: RwLock<AgentConfiguration>,
}

impl MemoryConfigStore {
    pub fn new(config: AgentConfiguration) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Copy of the current configuration.
    pub async fn snapshot(&self) -> AgentConfiguration {
        self.config.read().await.clone()
    }
}

#[async_trait]
impl AgentConfigStore for MemoryConfigStore {
    async fn get(&self) -> Result<AgentConfiguration, StoreError> {
        Ok(self.config.read().await.clone())
    }

    async fn update_counter(&self, counter: u64) -> Result<(), StoreError> {
        self.config.write().await.voucher_counter = counter;
        Ok(())
    }
}

/// Configuration persisted as a pretty-printed JSON file.
///
/// Updates are written to a sibling `.tmp` file and renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a full configuration, replacing whatever is stored.
    pub async fn save(&self, config: &AgentConfiguration) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AgentConfigStore for JsonFileConfigStore {
    async fn get(&self) -> Result<AgentConfiguration, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    async fn update_counter(&self, counter: u64) -> Result<(), StoreError> {
        let mut config = self.get().await?;
        config.voucher_counter = counter;
        self.save(&config).await
    }
}

/// Transactions held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransactionSource {
    transactions: Vec<RetentionTransaction>,
}

impl MemoryTransactionSource {
    pub fn new(transactions: Vec<RetentionTransaction>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl TransactionSource for MemoryTransactionSource {
    async fn transactions(
        &self,
        tax_type: TaxType,
        period: &str,
    ) -> Result<Vec<RetentionTransaction>, StoreError> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.tax_type == tax_type && t.fiscal_period == period)
            .cloned()
            .collect())
    }
}
