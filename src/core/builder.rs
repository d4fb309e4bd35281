use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::format::parse_iso_date;
use super::types::*;
use super::validation::expected_retention;

/// Builder for retention transactions.
///
/// Building never validates; run [`validate_transactions`](super::validate_transactions)
/// on the finished batch.
///
/// ```
/// use retenciones::core::*;
/// use rust_decimal_macros::dec;
///
/// let tx = RetentionTransactionBuilder::new(TaxType::Iva, "FAC-0001", "2025-01-15", "J-98765432-1")
///     .counterparty_name("Proveedor C.A.")
///     .control_number("00-00000001")
///     .amounts(dec!(116000), dec!(100000))
///     .percentage(dec!(75))
///     .computed_retention()
///     .build();
///
/// assert_eq!(tx.retention_amount, dec!(12000.00));
/// assert_eq!(tx.fiscal_period, "2025-01");
/// ```
pub struct RetentionTransactionBuilder {
    tax_type: TaxType,
    document_number: String,
    control_number: Option<String>,
    date: String,
    counterparty_rif: String,
    counterparty_name: String,
    concept: String,
    concept_code: Option<String>,
    total_amount: Decimal,
    taxable_base: Decimal,
    retention_percentage: Decimal,
    retention_amount: Option<Decimal>,
    fiscal_period: Option<String>,
    status: TransactionStatus,
}

impl RetentionTransactionBuilder {
    pub fn new(
        tax_type: TaxType,
        document_number: impl Into<String>,
        date: impl Into<String>,
        counterparty_rif: impl Into<String>,
    ) -> Self {
        Self {
            tax_type,
            document_number: document_number.into(),
            control_number: None,
            date: date.into(),
            counterparty_rif: counterparty_rif.into(),
            counterparty_name: String::new(),
            concept: String::new(),
            concept_code: None,
            total_amount: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
            retention_percentage: Decimal::ZERO,
            retention_amount: None,
            fiscal_period: None,
            status: TransactionStatus::Issued,
        }
    }

    pub fn control_number(mut self, control: impl Into<String>) -> Self {
        self.control_number = Some(control.into());
        self
    }

    pub fn counterparty_name(mut self, name: impl Into<String>) -> Self {
        self.counterparty_name = name.into();
        self
    }

    pub fn concept(mut self, concept: impl Into<String>) -> Self {
        self.concept = concept.into();
        self
    }

    /// ISLR concept code (`001`..`008`).
    pub fn concept_code(mut self, code: impl Into<String>) -> Self {
        self.concept_code = Some(code.into());
        self
    }

    /// Total invoice amount and taxable base.
    pub fn amounts(mut self, total: Decimal, taxable_base: Decimal) -> Self {
        self.total_amount = total;
        self.taxable_base = taxable_base;
        self
    }

    pub fn percentage(mut self, pct: Decimal) -> Self {
        self.retention_percentage = pct;
        self
    }

    /// Declared retention amount.
    pub fn retention(mut self, amount: Decimal) -> Self {
        self.retention_amount = Some(amount);
        self
    }

    /// Fill the retention amount from base and percentage.
    ///
    /// Left at zero when the product overflows; validation reports it.
    pub fn computed_retention(mut self) -> Self {
        self.retention_amount = expected_retention(
            self.tax_type,
            self.taxable_base,
            self.retention_percentage,
        );
        self
    }

    /// Declaration period; defaults to the month of the transaction date.
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.fiscal_period = Some(period.into());
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> RetentionTransaction {
        let fiscal_period = self.fiscal_period.unwrap_or_else(|| {
            parse_iso_date(&self.date)
                .map(period_of)
                .unwrap_or_else(|_| self.date.chars().take(7).collect())
        });
        RetentionTransaction {
            tax_type: self.tax_type,
            document_number: self.document_number,
            control_number: self.control_number,
            date: self.date,
            counterparty_rif: self.counterparty_rif,
            counterparty_name: self.counterparty_name,
            concept: self.concept,
            concept_code: self.concept_code,
            total_amount: self.total_amount,
            taxable_base: self.taxable_base,
            retention_percentage: self.retention_percentage,
            retention_amount: self.retention_amount.unwrap_or(Decimal::ZERO),
            fiscal_period,
            status: self.status,
        }
    }
}

/// Builder for [`AgentConfiguration`].
///
/// ```
/// use retenciones::core::AgentConfigurationBuilder;
///
/// let config = AgentConfigurationBuilder::new("J-12345678-9", "Empresa Demo C.A.", "20250800000001")
///     .address("Av. Principal, Caracas")
///     .build();
/// assert_eq!(config.voucher_counter, 1);
/// ```
pub struct AgentConfigurationBuilder {
    config: AgentConfiguration,
}

impl AgentConfigurationBuilder {
    /// Create a builder with the agent identity and initial voucher template.
    pub fn new(
        rif: impl Into<String>,
        legal_name: impl Into<String>,
        initial_voucher_number: impl Into<String>,
    ) -> Self {
        Self {
            config: AgentConfiguration {
                rif: rif.into(),
                legal_name: legal_name.into(),
                address: None,
                validity: None,
                initial_voucher_number: initial_voucher_number.into(),
                voucher_counter: 1,
            },
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = Some(address.into());
        self
    }

    /// Restrict declarations to an inclusive date window.
    pub fn validity(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.config.validity = Some(DeclarationWindow { from, to });
        self
    }

    /// Continue from a persisted counter.
    pub fn voucher_counter(mut self, counter: u64) -> Self {
        self.config.voucher_counter = counter;
        self
    }

    pub fn build(self) -> AgentConfiguration {
        self.config
    }
}
