//! Fuzz target for os-release and single-line file parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::{parse_first_line, parse_os_release};

fuzz_target!(|data: &str| {
    let _ = parse_os_release(data);
    let _ = parse_first_line(data);
});
