#![no_main]

use libfuzzer_sys::fuzz_target;
use retenciones::core::{format_rif, is_valid_rif, normalize_tax_id};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let formatted = format_rif(s);
        assert_eq!(normalize_tax_id(&formatted), normalize_tax_id(s));
        let _ = is_valid_rif(s);
    }
});
