//! Fuzz target for `lsblk -J` parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::parse_lsblk_json;

fuzz_target!(|data: &str| {
    let _ = parse_lsblk_json(data);
});
