//! Fuzz target for the dmidecode text parsers.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::{
    parse_dmi_baseboard, parse_dmi_bios, parse_dmi_memory, parse_dmi_slots, parse_meminfo,
};

fuzz_target!(|data: &str| {
    let _ = parse_dmi_baseboard(data);
    let _ = parse_dmi_bios(data);
    let _ = parse_dmi_memory(data);
    let _ = parse_dmi_slots(data);
    let _ = parse_meminfo(data);
});
