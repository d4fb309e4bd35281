//! ISLR withholding concept catalog.

use rust_decimal::Decimal;

/// An ISLR withholding category with its official rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IslrConcept {
    /// Three-digit concept code.
    pub code: &'static str,
    /// Official description.
    pub description: &'static str,
    rate_percent: u32,
}

impl IslrConcept {
    /// Official retention rate in percent.
    pub fn rate(&self) -> Decimal {
        Decimal::from(self.rate_percent)
    }
}

/// The fixed concept catalog, codes 001 to 008.
pub static ISLR_CONCEPTS: [IslrConcept; 8] = [
    IslrConcept {
        code: "001",
        description: "Honorarios profesionales",
        rate_percent: 5,
    },
    IslrConcept {
        code: "002",
        description: "Comisiones mercantiles",
        rate_percent: 5,
    },
    IslrConcept {
        code: "003",
        description: "Intereses de capitales",
        rate_percent: 5,
    },
    IslrConcept {
        code: "004",
        description: "Arrendamiento de bienes inmuebles",
        rate_percent: 5,
    },
    IslrConcept {
        code: "005",
        description: "Arrendamiento de bienes muebles",
        rate_percent: 5,
    },
    IslrConcept {
        code: "006",
        description: "Servicios de contratistas y subcontratistas",
        rate_percent: 2,
    },
    IslrConcept {
        code: "007",
        description: "Fletes y gastos de transporte",
        rate_percent: 3,
    },
    IslrConcept {
        code: "008",
        description: "Publicidad y propaganda",
        rate_percent: 5,
    },
];

/// Look up a concept by code (surrounding whitespace ignored).
pub fn islr_concept(code: &str) -> Option<&'static IslrConcept> {
    let code = code.trim();
    ISLR_CONCEPTS.iter().find(|c| c.code == code)
}
