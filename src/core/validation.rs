use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use super::concepts::islr_concept;
use super::format::{is_valid_rif, parse_iso_date, round_accounting};
use super::types::{RetentionTransaction, TaxType};

/// General IVA rate applied to the taxable base.
pub const IVA_RATE: Decimal = dec!(0.16);

/// Maximum accepted difference between declared and computed retention.
pub const RETENTION_TOLERANCE: Decimal = dec!(0.01);

/// IVA retention percentages accepted by SENIAT.
pub const IVA_RETENTION_PERCENTAGES: [Decimal; 2] = [dec!(75), dec!(100)];

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// Invoice number empty, too short, or with characters outside `[A-Za-z0-9-]`.
    DocumentNumber,
    /// Counterparty RIF not in `L-########-#` form.
    TaxId,
    /// Transaction date is not a real ISO date.
    Date,
    /// Total, base or retention out of range.
    Amounts,
    /// IVA percentage other than 75/100, or an ISLR percentage off the concept rate.
    RetentionPercentage,
    /// Declared retention differs from base × rate by more than the tolerance.
    RetentionCalculation,
    /// ISLR concept code missing or not in the catalog.
    ConceptCode,
    /// Control number missing (IVA) or malformed.
    ControlNumber,
}

/// A single finding, tied to the 1-based position of the transaction in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// 1-based position in the batch.
    pub line: usize,
    /// Name of the offending field.
    pub field: String,
    /// Bookkeeper-facing message, in Spanish.
    pub message: String,
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn new(line: usize, field: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            line,
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Línea {} ({}): {}", self.line, self.field, self.message)
    }
}

/// Outcome of validating one batch.
///
/// Errors block the export; warnings are reported but do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` exactly when `errors` is empty.
    pub valid: bool,
    /// Blocking findings, in line order.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking findings, in line order.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Errors of a given category.
    pub fn errors_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// Retention the fiscal rules expect for a base and percentage.
///
/// IVA: `base × 0.16 × pct / 100`. ISLR: `base × pct / 100`.
/// Returns `None` when the product does not fit in a [`Decimal`].
pub fn expected_retention(
    tax_type: TaxType,
    taxable_base: Decimal,
    percentage: Decimal,
) -> Option<Decimal> {
    let rate = percentage.checked_div(dec!(100))?;
    let expected = match tax_type {
        TaxType::Iva => taxable_base.checked_mul(IVA_RATE)?.checked_mul(rate)?,
        TaxType::Islr => taxable_base.checked_mul(rate)?,
    };
    Some(round_accounting(expected))
}

/// Validate a batch of transactions against the fiscal business rules.
///
/// Every violation is collected; the input is never modified.
pub fn validate_transactions<'a, I>(transactions: I) -> ValidationResult
where
    I: IntoIterator<Item = &'a RetentionTransaction>,
{
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (i, tx) in transactions.into_iter().enumerate() {
        let line = i + 1;
        validate_document_number(tx, line, &mut errors);
        validate_counterparty(tx, line, &mut errors);
        validate_date(tx, line, &mut errors);
        let amounts_ok = validate_amounts(tx, line, &mut errors, &mut warnings);
        match tx.tax_type {
            TaxType::Iva => validate_iva_retention(tx, line, amounts_ok, &mut errors),
            TaxType::Islr => validate_islr_retention(tx, line, amounts_ok, &mut errors),
        }
        validate_control_number(tx, line, &mut errors, &mut warnings);
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn validate_document_number(tx: &RetentionTransaction, line: usize, errors: &mut Vec<ValidationIssue>) {
    let number = tx.document_number.trim();
    if number.is_empty() {
        errors.push(ValidationIssue::new(
            line,
            "document_number",
            IssueKind::DocumentNumber,
            "número de documento vacío",
        ));
    } else if number.chars().count() < 3 {
        errors.push(ValidationIssue::new(
            line,
            "document_number",
            IssueKind::DocumentNumber,
            format!("número de documento '{number}' debe tener al menos 3 caracteres"),
        ));
    } else if !number.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        errors.push(ValidationIssue::new(
            line,
            "document_number",
            IssueKind::DocumentNumber,
            format!("número de documento '{number}' solo admite letras, dígitos y guiones"),
        ));
    }
}

fn validate_counterparty(tx: &RetentionTransaction, line: usize, errors: &mut Vec<ValidationIssue>) {
    if !is_valid_rif(tx.counterparty_rif.trim()) {
        errors.push(ValidationIssue::new(
            line,
            "counterparty_rif",
            IssueKind::TaxId,
            format!(
                "RIF del retenido '{}' inválido (formato esperado: J-12345678-9)",
                tx.counterparty_rif
            ),
        ));
    }
}

fn validate_date(tx: &RetentionTransaction, line: usize, errors: &mut Vec<ValidationIssue>) {
    if parse_iso_date(&tx.date).is_err() {
        errors.push(ValidationIssue::new(
            line,
            "date",
            IssueKind::Date,
            format!("fecha '{}' no es una fecha válida", tx.date),
        ));
    }
}

/// Returns whether the base is usable for the retention arithmetic check.
fn validate_amounts(
    tx: &RetentionTransaction,
    line: usize,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) -> bool {
    let mut ok = true;
    if tx.total_amount <= Decimal::ZERO {
        errors.push(ValidationIssue::new(
            line,
            "total_amount",
            IssueKind::Amounts,
            format!("monto total {} debe ser mayor que cero", tx.total_amount),
        ));
    }
    if tx.taxable_base < Decimal::ZERO {
        errors.push(ValidationIssue::new(
            line,
            "taxable_base",
            IssueKind::Amounts,
            format!("base imponible {} no puede ser negativa", tx.taxable_base),
        ));
        ok = false;
    } else if tx.total_amount > Decimal::ZERO && tx.taxable_base > tx.total_amount {
        warnings.push(ValidationIssue::new(
            line,
            "taxable_base",
            IssueKind::Amounts,
            format!(
                "base imponible {} excede el monto total {}",
                tx.taxable_base, tx.total_amount
            ),
        ));
    }
    ok
}

fn validate_iva_retention(
    tx: &RetentionTransaction,
    line: usize,
    amounts_ok: bool,
    errors: &mut Vec<ValidationIssue>,
) {
    if !IVA_RETENTION_PERCENTAGES.contains(&tx.retention_percentage) {
        errors.push(ValidationIssue::new(
            line,
            "retention_percentage",
            IssueKind::RetentionPercentage,
            format!(
                "porcentaje de retención de IVA debe ser 75 o 100 (recibido {})",
                tx.retention_percentage
            ),
        ));
        return;
    }
    if amounts_ok {
        check_retention_amount(tx, line, errors);
    }
}

fn validate_islr_retention(
    tx: &RetentionTransaction,
    line: usize,
    amounts_ok: bool,
    errors: &mut Vec<ValidationIssue>,
) {
    let Some(code) = tx.concept_code.as_deref().filter(|c| !c.trim().is_empty()) else {
        errors.push(ValidationIssue::new(
            line,
            "concept_code",
            IssueKind::ConceptCode,
            "código de concepto ISLR requerido",
        ));
        return;
    };
    let Some(concept) = islr_concept(code) else {
        errors.push(ValidationIssue::new(
            line,
            "concept_code",
            IssueKind::ConceptCode,
            format!("código de concepto ISLR '{code}' no reconocido"),
        ));
        return;
    };

    if tx.retention_percentage != concept.rate() {
        errors.push(ValidationIssue::new(
            line,
            "retention_percentage",
            IssueKind::RetentionPercentage,
            format!(
                "porcentaje {} no corresponde al concepto {} ({}): tasa oficial {}",
                tx.retention_percentage,
                concept.code,
                concept.description,
                concept.rate()
            ),
        ));
        return;
    }
    if amounts_ok {
        check_retention_amount(tx, line, errors);
    }
}

fn check_retention_amount(tx: &RetentionTransaction, line: usize, errors: &mut Vec<ValidationIssue>) {
    let difference = expected_retention(tx.tax_type, tx.taxable_base, tx.retention_percentage)
        .and_then(|expected| Some((expected, tx.retention_amount.checked_sub(expected)?)));
    let Some((expected, difference)) = difference else {
        errors.push(ValidationIssue::new(
            line,
            "retention_amount",
            IssueKind::Amounts,
            format!(
                "montos fuera de rango: base {} × {} % no es calculable",
                tx.taxable_base, tx.retention_percentage
            ),
        ));
        return;
    };
    if difference.abs() > RETENTION_TOLERANCE {
        errors.push(ValidationIssue::new(
            line,
            "retention_amount",
            IssueKind::RetentionCalculation,
            format!(
                "retención calculada incorrectamente: esperado {expected}, declarado {}",
                tx.retention_amount
            ),
        ));
    }
}

fn validate_control_number(
    tx: &RetentionTransaction,
    line: usize,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    match tx.control_number.as_deref().map(str::trim) {
        None | Some("") if tx.tax_type != TaxType::Iva => {}
        None | Some("") => warnings.push(ValidationIssue::new(
            line,
            "control_number",
            IssueKind::ControlNumber,
            "número de control ausente",
        )),
        Some(control) if !is_valid_control_number(control) => errors.push(ValidationIssue::new(
            line,
            "control_number",
            IssueKind::ControlNumber,
            format!("número de control '{control}' inválido (formato esperado: 00-00000000)"),
        )),
        Some(_) => {}
    }
}

/// Check the `##-########` control number layout.
pub fn is_valid_control_number(control: &str) -> bool {
    let b = control.as_bytes();
    b.len() == 11
        && b[..2].iter().all(u8::is_ascii_digit)
        && b[2] == b'-'
        && b[3..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionStatus;

    fn iva(base: Decimal, pct: Decimal, retention: Decimal) -> RetentionTransaction {
        RetentionTransaction {
            tax_type: TaxType::Iva,
            document_number: "FAC-001".into(),
            control_number: Some("00-00000001".into()),
            date: "2025-01-15".into(),
            counterparty_rif: "J-98765432-1".into(),
            counterparty_name: "Proveedor C.A.".into(),
            concept: "Compra de insumos".into(),
            concept_code: None,
            total_amount: base * dec!(1.16),
            taxable_base: base,
            retention_percentage: pct,
            retention_amount: retention,
            fiscal_period: "2025-01".into(),
            status: TransactionStatus::Issued,
        }
    }

    #[test]
    fn expected_iva_retention() {
        assert_eq!(expected_retention(TaxType::Iva, dec!(100000), dec!(75)), Some(dec!(12000.00)));
        assert_eq!(expected_retention(TaxType::Iva, dec!(250000), dec!(100)), Some(dec!(40000.00)));
    }

    #[test]
    fn expected_islr_retention() {
        assert_eq!(expected_retention(TaxType::Islr, dec!(1000), dec!(5)), Some(dec!(50.00)));
        assert_eq!(expected_retention(TaxType::Islr, dec!(333.33), dec!(3)), Some(dec!(10.00)));
    }

    #[test]
    fn expected_retention_overflow_is_none() {
        let huge = Decimal::from(100_000_000_000_000_000_000u128);
        assert_eq!(expected_retention(TaxType::Islr, huge, huge), None);
        assert_eq!(expected_retention(TaxType::Iva, Decimal::MAX, Decimal::MAX), None);
    }

    #[test]
    fn valid_iva_line() {
        let result = validate_transactions(&[iva(dec!(100000), dec!(75), dec!(12000))]);
        assert!(result.valid, "{result}");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn tolerance_is_one_cent() {
        let ok = validate_transactions(&[iva(dec!(100000), dec!(75), dec!(12000.01))]);
        assert!(ok.valid);
        let bad = validate_transactions(&[iva(dec!(100000), dec!(75), dec!(12000.02))]);
        assert!(!bad.valid);
        assert_eq!(bad.errors_of(IssueKind::RetentionCalculation).count(), 1);
    }

    #[test]
    fn invalid_percentage_skips_calculation_check() {
        let result = validate_transactions(&[iva(dec!(1000), dec!(50), dec!(80))]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, IssueKind::RetentionPercentage);
    }

    #[test]
    fn control_number_layout() {
        assert!(is_valid_control_number("00-12345678"));
        assert!(!is_valid_control_number("0-12345678"));
        assert!(!is_valid_control_number("00-1234567A"));
        assert!(!is_valid_control_number("0012345678"));
    }

    #[test]
    fn display_lists_every_error() {
        let mut tx = iva(dec!(1000), dec!(75), dec!(1));
        tx.counterparty_rif = "123".into();
        let result = validate_transactions(&[tx]);
        let text = result.to_string();
        assert!(text.contains("Línea 1 (counterparty_rif)"));
        assert!(text.contains("retención calculada incorrectamente"));
    }
}
