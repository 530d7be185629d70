//! Fuzz target for document validation.
//!
//! Documents handed to `spektor validate` come from arbitrary files.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::validate::validate_value;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let report = validate_value(&value);
        assert_eq!(report.valid, report.errors.is_empty());
    }
});
