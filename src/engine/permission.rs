use crate::core::{ExportFormat, TaxType};

/// Capability check run once when an export starts.
pub trait ExportPermission: Send + Sync {
    fn allows(&self, tax_type: TaxType, format: ExportFormat) -> bool;
}

/// Permits every export.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ExportPermission for AllowAll {
    fn allows(&self, _tax_type: TaxType, _format: ExportFormat) -> bool {
        true
    }
}

impl<F> ExportPermission for F
where
    F: Fn(TaxType, ExportFormat) -> bool + Send + Sync,
{
    fn allows(&self, tax_type: TaxType, format: ExportFormat) -> bool {
        self(tax_type, format)
    }
}
