#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = retenciones::core::encode_date(s);
        let _ = retenciones::core::encode_period(s);
    }
});
