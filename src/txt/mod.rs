//! SENIAT TXT declaration files.
//!
//! One header row followed by one `;`-delimited record per retention, in the
//! order of the declaration lines. Rows are joined with CRLF.
//!
//! IVA columns: agent RIF, period, counterparty RIF, voucher number, date,
//! invoice number, taxable base, percentage, retention amount. ISLR adds the
//! concept code before the taxable base.

use crate::core::{
    Declaration, DeclarationLine, RetencionError, TaxType, encode_date, encode_period,
    format_amount, normalize_tax_id,
};

const IVA_HEADER: [&str; 9] = [
    "RIF_AGENTE",
    "PERIODO",
    "RIF_RETENIDO",
    "NUMERO_COMPROBANTE",
    "FECHA_DOCUMENTO",
    "NUMERO_FACTURA",
    "BASE_IMPONIBLE",
    "PORCENTAJE_RETENCION",
    "MONTO_RETENIDO",
];

const ISLR_HEADER: [&str; 10] = [
    "RIF_AGENTE",
    "PERIODO",
    "RIF_RETENIDO",
    "NUMERO_COMPROBANTE",
    "FECHA_DOCUMENTO",
    "NUMERO_FACTURA",
    "CODIGO_CONCEPTO",
    "BASE_IMPONIBLE",
    "PORCENTAJE_RETENCION",
    "MONTO_RETENIDO",
];

/// Render a declaration as SENIAT TXT.
pub fn to_txt(declaration: &Declaration<'_>) -> Result<String, RetencionError> {
    let agent_rif = normalize_tax_id(&declaration.agent.rif);
    let period = encode_period(declaration.period)?;

    let header: &[&str] = match declaration.tax_type {
        TaxType::Iva => &IVA_HEADER,
        TaxType::Islr => &ISLR_HEADER,
    };

    let mut rows = Vec::with_capacity(declaration.lines.len() + 1);
    rows.push(header.join(";"));
    for line in &declaration.lines {
        rows.push(render_row(declaration.tax_type, &agent_rif, &period, line)?);
    }
    Ok(rows.join("\r\n"))
}

fn render_row(
    tax_type: TaxType,
    agent_rif: &str,
    period: &str,
    line: &DeclarationLine<'_>,
) -> Result<String, RetencionError> {
    let tx = line.transaction;
    let mut fields = vec![
        agent_rif.to_string(),
        period.to_string(),
        normalize_tax_id(&tx.counterparty_rif),
        line.voucher_number.to_string(),
        encode_date(&tx.date)?,
        field_text(&tx.document_number),
    ];
    if tax_type == TaxType::Islr {
        fields.push(field_text(tx.concept_code.as_deref().unwrap_or("")));
    }
    fields.push(format_amount(tx.taxable_base));
    fields.push(format_amount(tx.retention_percentage));
    fields.push(format_amount(tx.retention_amount));
    Ok(fields.join(";"))
}

/// Free text cannot carry the column separator or line breaks.
fn field_text(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ';' | '\r' | '\n'))
        .collect()
}
