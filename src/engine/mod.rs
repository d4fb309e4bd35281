//! Export orchestration: configuration, validation, numbering, rendering, and
//! counter persistence.
//!
//! One export runs as
//! `load config → validate → allocate + render → persist counter`.
//! Configuration and validation failures abort before any number is issued
//! or any state is written. A failed counter write does not invalidate the
//! document already produced; it is returned as [`PersistenceStatus::Failed`]
//! and logged at error level, since retrying would reissue the same numbers.
//!
//! Exports for the same agent must not run concurrently: two calls reading
//! the same counter allocate overlapping voucher numbers. Use
//! [`SerializedExporter`] or an equivalent single-writer queue.
//!
//! # Example
//!
//! ```no_run
//! use retenciones::core::*;
//! use retenciones::engine::*;
//! use rust_decimal_macros::dec;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfigurationBuilder::new("J-12345678-9", "Empresa Demo C.A.", "20250800000001")
//!     .build();
//! let transactions = vec![
//!     RetentionTransactionBuilder::new(TaxType::Iva, "FAC-0001", "2025-01-15", "J-98765432-1")
//!         .control_number("00-00000001")
//!         .amounts(dec!(116000), dec!(100000))
//!         .percentage(dec!(75))
//!         .computed_retention()
//!         .build(),
//! ];
//!
//! let engine = ExportEngine::new(MemoryConfigStore::new(config));
//! let outcome = engine
//!     .export(&transactions, TaxType::Iva, ExportFormat::Txt, &ExportOptions::new("2025-01"))
//!     .await?;
//! std::fs::write(&outcome.document.file_name, &outcome.document.content)?;
//! # Ok(())
//! # }
//! # fn main() {
//! #     let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! #     rt.block_on(run()).unwrap();
//! # }
//! ```

mod permission;
mod serial;
mod store;

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use permission::{AllowAll, ExportPermission};
pub use serial::SerializedExporter;
pub use store::{
    AgentConfigStore, JsonFileConfigStore, MemoryConfigStore, MemoryTransactionSource,
    TransactionSource,
};

use crate::core::{
    AgentConfiguration, Declaration, DeclarationLine, ExportFormat, ExportOptions,
    RetencionError, RetentionTransaction, TaxType, VoucherSequence, encode_period,
    export_file_name, validate_transactions,
};

/// A finished SENIAT artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// Tax type declared.
    pub tax_type: TaxType,
    /// Artifact format of `content`.
    pub format: ExportFormat,
    /// Declared period (`YYYY-MM`).
    pub period: String,
    /// `{TAXTYPE}_{YYYYMM}_SENIAT.{ext}`.
    pub file_name: String,
    /// Rendered TXT or XML text.
    pub content: String,
    /// Voucher numbers issued, in line order.
    pub voucher_numbers: Vec<String>,
    /// Sum of the rounded taxable bases.
    pub total_base: Decimal,
    /// Sum of the rounded retention amounts.
    pub total_retained: Decimal,
}

impl ExportDocument {
    /// Number of declared retentions (header excluded).
    pub fn line_count(&self) -> usize {
        self.voucher_numbers.len()
    }
}

/// Result of writing the advanced voucher counter back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// Counter stored.
    Committed { counter: u64 },
    /// Counter not stored; the issued numbers may be reissued by a retry.
    Failed { counter: u64, error: String },
}

impl PersistenceStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// A successful export and the fate of its counter update.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    /// The artifact, valid whatever happened to the counter.
    pub document: ExportDocument,
    /// Whether the advanced counter reached the store.
    pub persistence: PersistenceStatus,
}

/// Produces SENIAT declarations for one withholding agent.
pub struct ExportEngine<S> {
    store: S,
    permission: Arc<dyn ExportPermission>,
}

impl<S: AgentConfigStore> ExportEngine<S> {
    /// Engine with every export permitted.
    pub fn new(store: S) -> Self {
        Self {
            store,
            permission: Arc::new(AllowAll),
        }
    }

    /// Replace the capability check run at the start of every export.
    pub fn with_permission(mut self, permission: impl ExportPermission + 'static) -> Self {
        self.permission = Arc::new(permission);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the batch from `source` and export it.
    pub async fn export_from_source<T: TransactionSource + ?Sized>(
        &self,
        source: &T,
        tax_type: TaxType,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportOutcome, RetencionError> {
        let transactions = source
            .transactions(tax_type, &options.period)
            .await
            .map_err(RetencionError::Source)?;
        self.export(&transactions, tax_type, format, options).await
    }

    /// Export the transactions matching `tax_type` and the requested period.
    ///
    /// Lines keep the order of `transactions`; voucher numbers follow it.
    pub async fn export(
        &self,
        transactions: &[RetentionTransaction],
        tax_type: TaxType,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportOutcome, RetencionError> {
        let period = options.period.as_str();

        if !self.permission.allows(tax_type, format) {
            warn!(%tax_type, %format, "export rejected by capability check");
            return Err(RetencionError::NotPermitted(format!(
                "{tax_type} {format} export is not enabled"
            )));
        }
        encode_period(period)?;

        info!(%tax_type, %format, period, "starting export");

        let config = self.load_config(period).await?;

        let batch: Vec<&RetentionTransaction> = transactions
            .iter()
            .filter(|t| t.tax_type == tax_type && t.fiscal_period == period)
            .collect();
        debug!(
            received = transactions.len(),
            matching = batch.len(),
            "filtered batch"
        );
        if batch.is_empty() {
            return Err(RetencionError::NoTransactions {
                tax_type,
                period: period.to_string(),
            });
        }

        let validation = validate_transactions(batch.iter().copied());
        for w in &validation.warnings {
            warn!(line = w.line, field = %w.field, "{}", w.message);
        }
        if !validation.valid {
            warn!(
                errors = validation.errors.len(),
                "validation failed, export aborted"
            );
            return Err(RetencionError::Validation(validation));
        }

        let sequence = VoucherSequence::new(&config.initial_voucher_number, config.voucher_counter)?;
        let (voucher_numbers, next) = sequence.reserve(batch.len())?;
        debug!(
            first = sequence.counter(),
            next = next.counter(),
            "voucher range allocated"
        );

        let (content, total_base, total_retained) = {
            let declaration = Declaration {
                tax_type,
                period,
                agent: &config,
                lines: batch
                    .iter()
                    .zip(&voucher_numbers)
                    .map(|(tx, number)| DeclarationLine {
                        voucher_number: number.as_str(),
                        transaction: *tx,
                    })
                    .collect(),
            };
            let content = match format {
                ExportFormat::Txt => crate::txt::to_txt(&declaration)?,
                ExportFormat::Xml => {
                    let generated_at = options
                        .generated_at
                        .unwrap_or_else(|| Utc::now().naive_utc());
                    crate::xml::to_xml(&declaration, generated_at)?
                }
            };
            (content, declaration.total_base()?, declaration.total_retained()?)
        };
        let file_name = export_file_name(tax_type, period, format)?;

        let persistence = self.persist_counter(sequence.counter(), next.counter()).await;

        info!(
            %tax_type,
            %format,
            period,
            lines = voucher_numbers.len(),
            issued_from = sequence.counter(),
            issued_to = next.counter() - 1,
            "export finished"
        );

        Ok(ExportOutcome {
            document: ExportDocument {
                tax_type,
                format,
                period: period.to_string(),
                file_name,
                content,
                voucher_numbers,
                total_base,
                total_retained,
            },
            persistence,
        })
    }

    async fn load_config(&self, period: &str) -> Result<AgentConfiguration, RetencionError> {
        let config = self.store.get().await.map_err(|e| {
            RetencionError::Configuration(format!("could not load agent configuration: {e}"))
        })?;
        config.require_identity()?;
        if let Some(window) = &config.validity {
            if !window.covers_period(period)? {
                return Err(RetencionError::Configuration(format!(
                    "period {period} is outside the declaration window {} to {}",
                    window.from, window.to
                )));
            }
        }
        debug!(agent = %config.rif, counter = config.voucher_counter, "configuration loaded");
        Ok(config)
    }

    async fn persist_counter(&self, first: u64, next: u64) -> PersistenceStatus {
        match self.store.update_counter(next).await {
            Ok(()) => {
                debug!(counter = next, "voucher counter persisted");
                PersistenceStatus::Committed { counter: next }
            }
            Err(e) => {
                error!(
                    issued_from = first,
                    issued_to = next - 1,
                    counter = next,
                    error = %e,
                    "voucher counter NOT persisted; retrying this export will reissue the same voucher numbers"
                );
                PersistenceStatus::Failed {
                    counter: next,
                    error: e.to_string(),
                }
            }
        }
    }
}
