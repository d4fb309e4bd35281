//! SENIAT XML declaration documents.
//!
//! Layout per tax type:
//!
//! | | IVA | ISLR |
//! |---|---|---|
//! | root | `RelacionRetencionesIVA` | `RelacionRetencionesISLR` |
//! | identity block | `Agente` | `Encabezado` |
//! | detail block | `Detalle` | `DetalleRetencion` |
//!
//! The root carries `RifAgente` and `Periodo` attributes. Each retention is a
//! `Retencion` element inside the detail block, and a `Resumen` trailer holds
//! the line count, totals, and the generation timestamp.

mod writer;

use chrono::NaiveDateTime;

pub use writer::XmlWriter;

use crate::core::{
    Declaration, DeclarationLine, RetencionError, TaxType, encode_date, encode_period,
    format_amount, normalize_tax_id,
};

struct Layout {
    root: &'static str,
    identity: &'static str,
    detail: &'static str,
}

fn layout(tax_type: TaxType) -> Layout {
    match tax_type {
        TaxType::Iva => Layout {
            root: "RelacionRetencionesIVA",
            identity: "Agente",
            detail: "Detalle",
        },
        TaxType::Islr => Layout {
            root: "RelacionRetencionesISLR",
            identity: "Encabezado",
            detail: "DetalleRetencion",
        },
    }
}

/// Render a declaration as SENIAT XML.
pub fn to_xml(
    declaration: &Declaration<'_>,
    generated_at: NaiveDateTime,
) -> Result<String, RetencionError> {
    let layout = layout(declaration.tax_type);
    let agent = declaration.agent;
    let agent_rif = normalize_tax_id(&agent.rif);
    let period = encode_period(declaration.period)?;

    let mut w = XmlWriter::new()?;
    w.open(
        layout.root,
        &[("RifAgente", agent_rif.as_str()), ("Periodo", period.as_str())],
    )?;

    w.block(layout.identity, |w| {
        w.leaf("RifAgente", &agent_rif)?;
        w.leaf("RazonSocial", agent.legal_name.trim())?;
        if let Some(address) = agent.address.as_deref().filter(|a| !a.trim().is_empty()) {
            w.leaf("Direccion", address.trim())?;
        }
        w.leaf("Periodo", &period)?;
        w.leaf("TipoImpuesto", declaration.tax_type.code())
    })?;

    w.block(layout.detail, |w| {
        declaration
            .lines
            .iter()
            .try_for_each(|line| write_retention(w, declaration.tax_type, line))
    })?;

    let total_base = declaration.total_base()?;
    let total_retained = declaration.total_retained()?;
    w.block("Resumen", |w| {
        w.leaf("CantidadTransacciones", &declaration.lines.len().to_string())?;
        w.leaf("TotalBaseImponible", &format_amount(total_base))?;
        w.leaf("TotalRetenido", &format_amount(total_retained))?;
        w.leaf(
            "FechaGeneracion",
            &generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )
    })?;

    w.close(layout.root)?;
    w.finish()
}

fn write_retention(
    w: &mut XmlWriter,
    tax_type: TaxType,
    line: &DeclarationLine<'_>,
) -> Result<(), RetencionError> {
    let tx = line.transaction;
    w.block("Retencion", |w| {
        w.leaf("RifRetenido", &normalize_tax_id(&tx.counterparty_rif))?;
        w.leaf("NombreRetenido", tx.counterparty_name.trim())?;
        w.leaf("NumeroComprobante", line.voucher_number)?;
        w.leaf("FechaDocumento", &encode_date(&tx.date)?)?;
        w.leaf("NumeroFactura", tx.document_number.trim())?;
        match tax_type {
            TaxType::Iva => {
                if let Some(control) = tx.control_number.as_deref().filter(|c| !c.trim().is_empty()) {
                    w.leaf("NumeroControl", control.trim())?;
                }
            }
            TaxType::Islr => {
                w.leaf("CodigoConcepto", tx.concept_code.as_deref().unwrap_or("").trim())?;
            }
        }
        if !tx.concept.trim().is_empty() {
            w.leaf("Concepto", tx.concept.trim())?;
        }
        w.leaf("MontoTotal", &format_amount(tx.total_amount))?;
        w.leaf("BaseImponible", &format_amount(tx.taxable_base))?;
        w.leaf("PorcentajeRetencion", &format_amount(tx.retention_percentage))?;
        w.leaf("MontoRetenido", &format_amount(tx.retention_amount))
    })
}
