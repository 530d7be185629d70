//! PCI and USB bus parsers.

use regex::Regex;
use sk_common::{GpuEntry, PciDevice, UsbDevice};
use std::sync::OnceLock;

/// Parse `lspci -mm` machine-readable output.
///
/// Lines are split into shell words; lines with fewer than three words or
/// unbalanced quotes are skipped. Trailing `-rXX`/`-pXX` options and the
/// subsystem columns are ignored.
pub fn parse_lspci_mm(output: &str) -> Vec<PciDevice> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(shlex::split)
        .filter(|words| words.len() >= 3)
        .map(|words| {
            let mut words = words.into_iter();
            PciDevice {
                slot: words.next().unwrap_or_default(),
                class: words.next(),
                vendor: words.next(),
                device: words.next(),
            }
        })
        .collect()
}

fn lsusb_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Bus (\d{3}) Device (\d{3}): ID ([0-9a-fA-F]{4}:[0-9a-fA-F]{4}) (.+)")
            .expect("static lsusb pattern")
    })
}

/// Parse plain `lsusb` output.
pub fn parse_lsusb(output: &str) -> Vec<UsbDevice> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let caps = lsusb_line().captures(line)?;
            let description = caps[4].trim();
            Some(UsbDevice {
                bus: caps[1].to_string(),
                device: caps[2].to_string(),
                id: caps[3].to_string(),
                description: (!description.is_empty()).then(|| description.to_string()),
            })
        })
        .collect()
}

/// Derive GPU entries from PCI devices whose class mentions VGA or 3D.
pub fn gpus_from_pci(devices: &[PciDevice]) -> Vec<GpuEntry> {
    devices
        .iter()
        .filter(|dev| {
            let class = dev.class.as_deref().unwrap_or("").to_ascii_lowercase();
            class.contains("vga") || class.contains("3d")
        })
        .map(|dev| GpuEntry {
            name: dev.device.clone(),
            vendor: dev.vendor.clone(),
            bus: Some(dev.slot.clone()),
        })
        .collect()
}
