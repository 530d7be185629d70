//! Pure parsers for probe output.
//!
//! One function per source grammar. Every parser accepts arbitrary text and
//! returns a default value (empty map, empty list, all-`None` struct) when the
//! input is empty or malformed; none of them panic.
//!
//! # Sources
//! - `/etc/os-release`, `uname`, `/proc/1/comm` ([`os`])
//! - `lscpu -J`, `/proc/cpuinfo` ([`cpu`])
//! - `/proc/meminfo`, `dmidecode -t memory` ([`memory`])
//! - `dmidecode -t baseboard|bios|slot` ([`dmi`])
//! - `lspci -mm`, `lsusb` ([`bus`])
//! - `lsblk -J -O -b` ([`storage`])
//! - `ip -j address` ([`network`])
//! - package managers, `--version` lines, `mokutil` ([`software`])

pub mod bus;
pub mod cpu;
pub mod dmi;
pub mod memory;
pub mod network;
pub mod os;
pub mod software;
pub mod storage;

pub use bus::{gpus_from_pci, parse_lspci_mm, parse_lsusb};
pub use cpu::{cpu_section_from_facts, parse_cpuinfo, parse_lscpu_json, CpuFacts};
pub use dmi::{parse_dmi_baseboard, parse_dmi_bios, parse_dmi_slots, BiosInfo};
pub use memory::{parse_dmi_memory, parse_meminfo, parse_size_with_unit};
pub use network::parse_ip_addr_json;
pub use os::{parse_first_line, parse_os_release, OsRelease};
pub use software::{
    non_empty_lines, parse_package_list, parse_secure_boot, parse_version_line, PackageManager,
    DEFAULT_PACKAGE_LIMIT,
};
pub use storage::parse_lsblk_json;

/// Value of a `Label: value` line, trimmed; empty values become `None`.
///
/// `line` is matched after trimming leading whitespace, so indented
/// dmidecode fields work unchanged.
pub(crate) fn labeled_value(line: &str, label: &str) -> Option<Option<String>> {
    let rest = line.trim_start().strip_prefix(label)?;
    let rest = rest.strip_prefix(':')?;
    let value = rest.trim();
    Some(if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    })
}

/// Leading integer of a value such as `"8 (online)"`.
pub(crate) fn int_from(value: &str) -> Option<u32> {
    value.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value() {
        assert_eq!(
            labeled_value("\tManufacturer: ASUSTeK", "Manufacturer"),
            Some(Some("ASUSTeK".to_string()))
        );
        assert_eq!(labeled_value("Serial Number:   ", "Serial Number"), Some(None));
        assert_eq!(labeled_value("Manufacturer ASUSTeK", "Manufacturer"), None);
        assert_eq!(labeled_value("Version: 1", "Vendor"), None);
    }

    #[test]
    fn test_int_from() {
        assert_eq!(int_from("8 (online)"), Some(8));
        assert_eq!(int_from("  16"), Some(16));
        assert_eq!(int_from("N/A"), None);
        assert_eq!(int_from(""), None);
    }
}
