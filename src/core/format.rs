//! Field encodings shared by the TXT and XML renderers.
//!
//! All monetary output goes through [`format_amount`]; both artifacts use the
//! same `D.DD` representation with a literal decimal point.

use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::RetencionError;
use super::types::{ExportFormat, TaxType};

/// Strip everything but ASCII digits from a RIF ("J-12345678-9" → "123456789").
pub fn normalize_tax_id(id: &str) -> String {
    id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical display form of a RIF: `L-########-#`.
///
/// A leading letter is kept (uppercased); inputs that do not carry exactly
/// nine digits are returned as letter plus digits without grouping.
pub fn format_rif(id: &str) -> String {
    let trimmed = id.trim();
    let letter = trimmed
        .chars()
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase());
    let digits = normalize_tax_id(trimmed);

    let body = if digits.len() == 9 {
        format!("{}-{}", &digits[..8], &digits[8..])
    } else {
        digits
    };

    match letter {
        Some(l) => format!("{l}-{body}"),
        None => body,
    }
}

/// RIF prefixes accepted by SENIAT.
pub const RIF_PREFIXES: [char; 7] = ['V', 'E', 'J', 'G', 'P', 'R', 'C'];

/// Check the `[VEJGPRC]-########-#` RIF layout.
pub fn is_valid_rif(id: &str) -> bool {
    let b = id.as_bytes();
    b.len() == 12
        && RIF_PREFIXES.contains(&(b[0] as char))
        && b[1] == b'-'
        && b[2..10].iter().all(u8::is_ascii_digit)
        && b[10] == b'-'
        && b[11].is_ascii_digit()
}

/// Parse an ISO date (`YYYY-MM-DD` or an RFC 3339 timestamp).
pub fn parse_iso_date(iso: &str) -> Result<NaiveDate, RetencionError> {
    let iso = iso.trim();
    if let Ok(d) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.date_naive())
        .map_err(|_| RetencionError::Format(format!("'{iso}' is not a valid ISO date")))
}

/// Re-encode an ISO date as `YYYYMMDD`.
pub fn encode_date(iso: &str) -> Result<String, RetencionError> {
    Ok(parse_iso_date(iso)?.format("%Y%m%d").to_string())
}

/// Encode a `YYYY-MM` period as `YYYYMM`.
pub fn encode_period(period: &str) -> Result<String, RetencionError> {
    let (start, _) = period_bounds(period)?;
    Ok(format!("{:04}{:02}", start.year(), start.month()))
}

/// First and last day of a `YYYY-MM` period.
pub(crate) fn period_bounds(period: &str) -> Result<(NaiveDate, NaiveDate), RetencionError> {
    let invalid = || RetencionError::Format(format!("'{period}' is not a YYYY-MM period"));

    let b = period.as_bytes();
    if b.len() != 7
        || b[4] != b'-'
        || !b[..4].iter().all(u8::is_ascii_digit)
        || !b[5..].iter().all(u8::is_ascii_digit)
    {
        return Err(invalid());
    }
    let year: i32 = period[..4].parse().map_err(|_| invalid())?;
    let month: u32 = period[5..].parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next.pred_opt().ok_or_else(invalid)?;
    Ok((start, end))
}

/// Round to 2 decimal places, half away from zero.
pub fn round_accounting(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as `D.DD` (no grouping, literal `.`).
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_accounting(amount))
}

/// Escape XML text content. `&` is replaced first.
pub fn escape_xml_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// File name callers use for an artifact: `{TAXTYPE}_{YYYYMM}_SENIAT.{ext}`.
pub fn export_file_name(
    tax_type: TaxType,
    period: &str,
    format: ExportFormat,
) -> Result<String, RetencionError> {
    Ok(format!(
        "{}_{}_SENIAT.{}",
        tax_type.code(),
        encode_period(period)?,
        format.extension()
    ))
}
