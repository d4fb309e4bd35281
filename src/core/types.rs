use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::RetencionError;
use super::format::period_bounds;

/// Withholding tax a declaration is filed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    /// Impuesto al Valor Agregado (value-added tax).
    #[serde(rename = "IVA")]
    Iva,
    /// Impuesto Sobre la Renta (income tax).
    #[serde(rename = "ISLR")]
    Islr,
}

impl TaxType {
    /// Code used in file names and XML root elements.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Iva => "IVA",
            Self::Islr => "ISLR",
        }
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Output artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Semicolon-delimited text, CRLF line endings.
    Txt,
    /// UTF-8 XML document.
    Xml,
}

impl ExportFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Txt => "TXT",
            Self::Xml => "XML",
        })
    }
}

/// Lifecycle of a retention as tracked by the entry workflow.
///
/// Carried through unchanged; the export never filters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Captured but not yet issued to the counterparty.
    Draft,
    /// Voucher issued.
    #[default]
    Issued,
    /// Included in a declaration already filed.
    Declared,
    /// Voided.
    Annulled,
}

/// One withheld-tax event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionTransaction {
    /// IVA or ISLR.
    pub tax_type: TaxType,
    /// Invoice (document) number.
    pub document_number: String,
    /// SENIAT control number of the invoice (IVA only, optional).
    pub control_number: Option<String>,
    /// Transaction date as an ISO string (`YYYY-MM-DD` or RFC 3339).
    pub date: String,
    /// RIF of the withheld counterparty.
    pub counterparty_rif: String,
    /// Legal name of the withheld counterparty.
    pub counterparty_name: String,
    /// Free-text concept.
    pub concept: String,
    /// ISLR concept code (`001`..`008`).
    pub concept_code: Option<String>,
    /// Total invoice amount.
    pub total_amount: Decimal,
    /// Amount subject to withholding.
    pub taxable_base: Decimal,
    /// Retention percentage (75/100 for IVA, concept rate for ISLR).
    pub retention_percentage: Decimal,
    /// Amount withheld.
    pub retention_amount: Decimal,
    /// Fiscal period the retention is declared in (`YYYY-MM`).
    pub fiscal_period: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: TransactionStatus,
}

/// Inclusive date range in which the agent is allowed to declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationWindow {
    /// First day covered.
    pub from: NaiveDate,
    /// Last day covered.
    pub to: NaiveDate,
}

impl DeclarationWindow {
    /// Whether any day of the `YYYY-MM` period falls inside the window.
    pub fn covers_period(&self, period: &str) -> Result<bool, RetencionError> {
        let (start, end) = period_bounds(period)?;
        Ok(start <= self.to && end >= self.from)
    }
}

/// Filer identity and declaration state (the withholding agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    /// Agent RIF (e.g. "J-12345678-9").
    pub rif: String,
    /// Agent legal name (razón social).
    pub legal_name: String,
    /// Fiscal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Period in which declarations are valid.
    #[serde(default)]
    pub validity: Option<DeclarationWindow>,
    /// Initial voucher number template; the trailing 8 digits are the sequence.
    pub initial_voucher_number: String,
    /// Next counter value to use (1-based).
    #[serde(default = "default_counter")]
    pub voucher_counter: u64,
}

fn default_counter() -> u64 {
    1
}

impl AgentConfiguration {
    /// Fail unless the fields required for a legally valid document are present.
    pub fn require_identity(&self) -> Result<(), RetencionError> {
        let mut missing = Vec::new();
        if self.rif.trim().is_empty() {
            missing.push("RIF del agente");
        }
        if self.legal_name.trim().is_empty() {
            missing.push("razón social del agente");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RetencionError::Configuration(format!(
                "agent identity incomplete: missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// Caller-supplied export parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Fiscal period to declare (`YYYY-MM`).
    pub period: String,
    /// Timestamp written into the XML trailer; current UTC time when `None`.
    pub generated_at: Option<NaiveDateTime>,
}

impl ExportOptions {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            generated_at: None,
        }
    }

    /// Pin the generation timestamp (reproducible XML output).
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }
}

/// A transaction paired with the voucher number issued for it.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationLine<'a> {
    /// Voucher (comprobante) number allocated to this line.
    pub voucher_number: &'a str,
    /// The retention being declared.
    pub transaction: &'a RetentionTransaction,
}

/// Everything a renderer needs to produce one SENIAT artifact.
///
/// Lines are rendered in the order given; renderers never sort.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    /// Tax type of every line.
    pub tax_type: TaxType,
    /// Fiscal period (`YYYY-MM`).
    pub period: &'a str,
    /// Filing agent.
    pub agent: &'a AgentConfiguration,
    /// Declared lines, in voucher order.
    pub lines: Vec<DeclarationLine<'a>>,
}

impl Declaration<'_> {
    /// Sum of the rounded taxable bases of all lines.
    pub fn total_base(&self) -> Result<Decimal, RetencionError> {
        self.checked_total("base imponible", |t| t.taxable_base)
    }

    /// Sum of the rounded retention amounts of all lines.
    pub fn total_retained(&self) -> Result<Decimal, RetencionError> {
        self.checked_total("monto retenido", |t| t.retention_amount)
    }

    fn checked_total(
        &self,
        what: &str,
        amount: impl Fn(&RetentionTransaction) -> Decimal,
    ) -> Result<Decimal, RetencionError> {
        self.lines.iter().try_fold(Decimal::ZERO, |acc, l| {
            acc.checked_add(super::format::round_accounting(amount(l.transaction)))
                .ok_or_else(|| RetencionError::Format(format!("total {what} overflows")))
        })
    }
}

/// Period (`YYYY-MM`) a date falls in.
pub fn period_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
