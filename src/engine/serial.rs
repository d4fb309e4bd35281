use tokio::sync::Mutex;
use tracing::debug;

use super::{AgentConfigStore, ExportEngine, ExportOutcome, TransactionSource};
use crate::core::{ExportFormat, ExportOptions, RetencionError, RetentionTransaction, TaxType};

/// Runs one agent's exports strictly one after another.
///
/// Each export holds the lock from configuration load to counter
/// persistence, so no two calls can read the same starting counter.
pub struct SerializedExporter<S> {
    engine: ExportEngine<S>,
    lock: Mutex<()>,
}

impl<S: AgentConfigStore> SerializedExporter<S> {
    pub fn new(engine: ExportEngine<S>) -> Self {
        Self {
            engine,
            lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &ExportEngine<S> {
        &self.engine
    }

    pub async fn export(
        &self,
        transactions: &[RetentionTransaction],
        tax_type: TaxType,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportOutcome, RetencionError> {
        let _guard = self.lock.lock().await;
        debug!(%tax_type, %format, "export lock acquired");
        self.engine
            .export(transactions, tax_type, format, options)
            .await
    }

    pub async fn export_from_source<T: TransactionSource + ?Sized>(
        &self,
        source: &T,
        tax_type: TaxType,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportOutcome, RetencionError> {
        let _guard = self.lock.lock().await;
        debug!(%tax_type, %format, "export lock acquired");
        self.engine
            .export_from_source(source, tax_type, format, options)
            .await
    }
}
