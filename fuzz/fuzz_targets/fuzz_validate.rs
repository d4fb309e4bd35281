#![no_main]

use libfuzzer_sys::fuzz_target;
use retenciones::core::*;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let fields: Vec<&str> = s.splitn(5, '|').collect();
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let amount = |i: usize| field(i).parse::<Decimal>().unwrap_or(Decimal::ZERO);

    let tx = RetentionTransactionBuilder::new(TaxType::Iva, field(0), field(1), field(2))
        .control_number(field(3))
        .amounts(amount(4), amount(4))
        .percentage(Decimal::new(75, 0))
        .computed_retention()
        .build();
    // Must not panic; errors are fine.
    let result = validate_transactions(&[tx]);
    assert_eq!(result.valid, result.errors.is_empty());
});
