//! Fuzz target for CPU parsing from `lscpu -J` and `/proc/cpuinfo`.
//!
//! Deeply nested `children` arrays exercise the recursive flattening.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::{cpu_section_from_facts, parse_cpuinfo, parse_lscpu_json};

fuzz_target!(|data: &str| {
    let _ = cpu_section_from_facts(&parse_lscpu_json(data));
    let _ = cpu_section_from_facts(&parse_cpuinfo(data));
});
