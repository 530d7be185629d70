//! Fuzz target for `lspci -mm` and `lsusb` parsing, plus GPU derivation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::{gpus_from_pci, parse_lspci_mm, parse_lsusb};

fuzz_target!(|data: &str| {
    let devices = parse_lspci_mm(data);
    let _ = gpus_from_pci(&devices);
    let _ = parse_lsusb(data);
});
