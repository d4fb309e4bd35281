//! Edge cases across formatting, numbering, validation and rendering.

#![cfg(feature = "core")]

use chrono::NaiveDate;
use retenciones::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn iva(doc: &str, date: &str) -> RetentionTransaction {
    RetentionTransactionBuilder::new(TaxType::Iva, doc, date, "J-98765432-1")
        .counterparty_name("Proveedor")
        .control_number("00-00000001")
        .amounts(dec!(1160), dec!(1000))
        .percentage(dec!(75))
        .computed_retention()
        .build()
}

// ---------------------------------------------------------------------------
// Amount formatting
// ---------------------------------------------------------------------------

#[test]
fn midpoints_round_away_from_zero() {
    assert_eq!(format_amount(dec!(0.005)), "0.01");
    assert_eq!(format_amount(dec!(2.675)), "2.68");
    assert_eq!(format_amount(dec!(-2.675)), "-2.68");
    assert_eq!(format_amount(dec!(0.0049)), "0.00");
}

#[test]
fn amounts_are_padded_to_two_decimals() {
    assert_eq!(format_amount(Decimal::ZERO), "0.00");
    assert_eq!(format_amount(dec!(7)), "7.00");
    assert_eq!(format_amount(dec!(7.5)), "7.50");
    assert_eq!(format_amount(dec!(1234567890.1)), "1234567890.10");
}

#[test]
fn float_sum_artifacts_do_not_leak() {
    assert_eq!(format_amount(dec!(0.1) + dec!(0.2)), "0.30");
    assert_eq!(format_amount(dec!(1.005) * dec!(100)), "100.50");
}

// ---------------------------------------------------------------------------
// Dates and periods
// ---------------------------------------------------------------------------

#[test]
fn leap_day() {
    assert_eq!(encode_date("2024-02-29").unwrap(), "20240229");
    assert!(encode_date("2025-02-29").is_err());
}

#[test]
fn rfc3339_keeps_local_calendar_day() {
    assert_eq!(encode_date("2025-01-31T23:30:00-04:00").unwrap(), "20250131");
    assert_eq!(encode_date("2025-01-01T00:00:00Z").unwrap(), "20250101");
}

#[test]
fn malformed_periods() {
    for bad in ["2025-1", "202501", "2025/01", "2025-00", "2025-13", "25-01", "abcd-ef", ""] {
        assert!(encode_period(bad).is_err(), "{bad:?} should be rejected");
    }
    assert_eq!(encode_period("2025-12").unwrap(), "202512");
}

#[test]
fn december_window_boundary() {
    let window = DeclarationWindow {
        from: date(2024, 12, 31),
        to: date(2024, 12, 31),
    };
    assert!(window.covers_period("2024-12").unwrap());
    assert!(!window.covers_period("2025-01").unwrap());
    assert!(!window.covers_period("2024-11").unwrap());
}

#[test]
fn transaction_period_follows_date() {
    assert_eq!(iva("FAC-001", "2024-12-31").fiscal_period, "2024-12");
    assert_eq!(iva("FAC-001", "2025-01-31T23:59:59-04:00").fiscal_period, "2025-01");
    let explicit = RetentionTransactionBuilder::new(TaxType::Iva, "FAC-001", "2025-01-31", "J-98765432-1")
        .period("2025-02")
        .build();
    assert_eq!(explicit.fiscal_period, "2025-02");
}

// ---------------------------------------------------------------------------
// RIF handling
// ---------------------------------------------------------------------------

#[test]
fn rif_normalization() {
    assert_eq!(normalize_tax_id("J-12345678-9"), "123456789");
    assert_eq!(normalize_tax_id(" v 12.345.678-9 "), "123456789");
    assert_eq!(format_rif("j123456789"), "J-12345678-9");
    assert_eq!(format_rif("123456789"), "12345678-9");
    assert!(!is_valid_rif("j-12345678-9"));
    assert!(!is_valid_rif("J-12345678-9 "));
    assert!(!is_valid_rif("Ñ-12345678-9"));
}

#[test]
fn rif_with_surrounding_space_is_accepted_by_validation() {
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.counterparty_rif = "  J-98765432-1 ".into();
    assert!(validate_transactions(&[tx]).valid);
}

// ---------------------------------------------------------------------------
// Voucher numbering
// ---------------------------------------------------------------------------

#[test]
fn template_must_hold_eight_digits() {
    assert!(matches!(
        VoucherSequence::new("1234567", 1),
        Err(RetencionError::Numbering(_))
    ));
    assert!(VoucherSequence::new("12345678", 1).is_ok());
    assert!(VoucherSequence::new("2025A800000001", 1).is_err());
    assert!(VoucherSequence::new("20250800000001", 0).is_err());
}

#[test]
fn eight_digit_template_has_no_prefix() {
    assert_eq!(allocate_voucher_number("00000001", 5).unwrap(), "00000005");
}

#[test]
fn sequence_exhaustion_is_an_error() {
    let seq = VoucherSequence::new("20250899999999", 1).unwrap();
    assert_eq!(seq.peek().unwrap(), "20250899999999");
    let (numbers, next) = seq.reserve(1).unwrap();
    assert_eq!(numbers, ["20250899999999"]);
    assert!(next.peek().is_err());
    assert!(seq.reserve(2).is_err());
    assert!(VoucherSequence::new("20250800000001", u64::MAX).unwrap().peek().is_err());
}

#[test]
fn zero_reservation() {
    let seq = VoucherSequence::new("20250800000001", 4).unwrap();
    let (numbers, next) = seq.reserve(0).unwrap();
    assert!(numbers.is_empty());
    assert_eq!(next, seq);
}

// ---------------------------------------------------------------------------
// Validation corner cases
// ---------------------------------------------------------------------------

#[test]
fn retention_within_one_cent_is_accepted() {
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.retention_amount = dec!(120.01);
    assert!(validate_transactions(&[tx.clone()]).valid);
    tx.retention_amount = dec!(120.02);
    assert!(!validate_transactions(&[tx]).valid);
}

#[test]
fn zero_base_with_zero_retention() {
    let tx = RetentionTransactionBuilder::new(TaxType::Iva, "FAC-001", "2025-01-10", "J-98765432-1")
        .control_number("00-00000001")
        .amounts(dec!(50), Decimal::ZERO)
        .percentage(dec!(100))
        .computed_retention()
        .build();
    assert_eq!(tx.retention_amount, Decimal::ZERO);
    assert!(validate_transactions(&[tx]).valid);
}

#[test]
fn islr_concept_code_is_trimmed() {
    assert_eq!(islr_concept(" 006 ").map(|c| c.rate()), Some(dec!(2)));
    assert!(islr_concept("6").is_none());
    assert_eq!(ISLR_CONCEPTS.len(), 8);
}

#[test]
fn mixed_tax_types_validate_by_their_own_rules() {
    let iva_ok = iva("FAC-001", "2025-01-10");
    let islr_ok = RetentionTransactionBuilder::new(TaxType::Islr, "HON-001", "2025-01-10", "V-12345678-0")
        .concept_code("007")
        .amounts(dec!(1000), dec!(1000))
        .percentage(dec!(3))
        .computed_retention()
        .build();
    let result = validate_transactions(&[iva_ok, islr_ok]);
    assert!(result.valid, "{result}");
    assert!(result.warnings.is_empty());
}

#[test]
fn issue_display_names_line_and_field() {
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.date = "2025-13-01".into();
    let result = validate_transactions(&[iva("FAC-000", "2025-01-10"), tx]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().starts_with("Línea 2 (date): "));
}

#[test]
fn islr_rate_mismatch_with_extreme_amounts_is_reported() {
    let huge = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
    let mut tx = RetentionTransactionBuilder::new(TaxType::Islr, "HON-001", "2025-01-10", "V-12345678-0")
        .concept_code("001")
        .amounts(huge, huge)
        .percentage(huge)
        .build();
    tx.retention_amount = dec!(1);

    let result = validate_transactions(&[tx]);
    assert!(!result.valid);
    assert_eq!(result.errors_of(IssueKind::RetentionPercentage).count(), 1);
    assert_eq!(result.errors_of(IssueKind::RetentionCalculation).count(), 0);
}

#[test]
fn uncomputable_retention_is_an_amount_error() {
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.total_amount = dec!(70000000000000000000000000000);
    tx.taxable_base = dec!(70000000000000000000000000000);
    tx.retention_percentage = dec!(100);
    tx.retention_amount = Decimal::MIN;

    let result = validate_transactions(&[tx]);
    let amount_errors: Vec<_> = result.errors_of(IssueKind::Amounts).collect();
    assert_eq!(amount_errors.len(), 1);
    assert_eq!(amount_errors[0].field, "retention_amount");
    assert!(amount_errors[0].message.contains("fuera de rango"));
}

#[test]
fn computed_retention_overflow_leaves_zero() {
    let tx = RetentionTransactionBuilder::new(TaxType::Islr, "HON-001", "2025-01-10", "V-12345678-0")
        .concept_code("001")
        .amounts(Decimal::MAX, Decimal::MAX)
        .percentage(Decimal::MAX)
        .computed_retention()
        .build();
    assert_eq!(tx.retention_amount, Decimal::ZERO);
    assert!(!validate_transactions(&[tx]).valid);
}

#[test]
fn declaration_totals_report_overflow() {
    let agent = AgentConfigurationBuilder::new("J-12345678-9", "Empresa", "20250800000001").build();
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.retention_amount = Decimal::MAX;
    let line = DeclarationLine {
        voucher_number: "20250800000001",
        transaction: &tx,
    };
    let declaration = Declaration {
        tax_type: TaxType::Iva,
        period: "2025-01",
        agent: &agent,
        lines: vec![line, line],
    };
    assert_eq!(declaration.total_base().unwrap(), dec!(2000.00));
    assert!(matches!(declaration.total_retained(), Err(RetencionError::Format(_))));
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

#[cfg(feature = "txt")]
#[test]
fn txt_drops_separators_from_free_text() {
    let agent = AgentConfigurationBuilder::new("J-12345678-9", "Empresa", "20250800000001").build();
    let mut tx = iva("FAC-001", "2025-01-10");
    tx.document_number = "FAC;001\r\n".into();
    let declaration = Declaration {
        tax_type: TaxType::Iva,
        period: "2025-01",
        agent: &agent,
        lines: vec![DeclarationLine {
            voucher_number: "20250800000001",
            transaction: &tx,
        }],
    };
    let txt = retenciones::txt::to_txt(&declaration).unwrap();
    assert_eq!(txt.matches("\r\n").count(), 1);
    assert!(txt.contains(";FAC001;"));
}

#[cfg(feature = "xml")]
#[test]
fn xml_keeps_non_ascii_text() {
    let agent = AgentConfigurationBuilder::new("J-12345678-9", "Compañía Añil, C.A.", "20250800000001").build();
    let tx = iva("FAC-001", "2025-01-10");
    let declaration = Declaration {
        tax_type: TaxType::Iva,
        period: "2025-01",
        agent: &agent,
        lines: vec![DeclarationLine {
            voucher_number: "20250800000001",
            transaction: &tx,
        }],
    };
    let xml = retenciones::xml::to_xml(&declaration, date(2025, 2, 1).and_hms_opt(0, 0, 0).unwrap()).unwrap();
    assert!(xml.contains("<RazonSocial>Compañía Añil, C.A.</RazonSocial>"));
}
