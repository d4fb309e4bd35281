use thiserror::Error;

use super::types::TaxType;
use super::validation::ValidationResult;

/// Errors that can occur while formatting, numbering or exporting a declaration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetencionError {
    /// Agent configuration is missing, incomplete or does not cover the period.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more transactions failed the fiscal business rules.
    ///
    /// The message is the complete list of errors, not just the first one.
    #[error("validation failed: {0}")]
    Validation(ValidationResult),

    /// Voucher template or counter cannot produce a valid number.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// A date, period or other field could not be encoded.
    #[error("format error: {0}")]
    Format(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The caller is not allowed to produce this declaration.
    #[error("export not permitted: {0}")]
    NotPermitted(String),

    /// Nothing left to declare after filtering by tax type and period.
    #[error("no {tax_type} transactions to export for period {period}")]
    NoTransactions {
        /// Requested tax type.
        tax_type: TaxType,
        /// Requested fiscal period (`YYYY-MM`).
        period: String,
    },

    /// The transaction source could not supply the batch.
    #[error("transaction source error: {0}")]
    Source(StoreError),
}

/// Errors raised by external collaborators (configuration store, transaction source).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Underlying file or device error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store rejected or could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
