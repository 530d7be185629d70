//! dmidecode parsers for baseboard, BIOS and system slots.

use super::labeled_value;
use sk_common::{Motherboard, PcieSlot, SlotLength};

/// BIOS identity from `dmidecode -t bios`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiosInfo {
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
}

/// Assign on first sighting only.
fn first(slot: &mut Option<Option<String>>, value: Option<String>) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Parse `dmidecode -t baseboard`; the first record's values win.
pub fn parse_dmi_baseboard(output: &str) -> Motherboard {
    let (mut vendor, mut product, mut serial) = (None, None, None);
    for line in output.lines() {
        if let Some(v) = labeled_value(line, "Manufacturer") {
            first(&mut vendor, v);
        } else if let Some(v) = labeled_value(line, "Product Name") {
            first(&mut product, v);
        } else if let Some(v) = labeled_value(line, "Serial Number") {
            first(&mut serial, v);
        }
    }
    Motherboard {
        vendor: vendor.flatten(),
        product: product.flatten(),
        serial: serial.flatten(),
    }
}

/// Parse `dmidecode -t bios`; the first record's values win.
pub fn parse_dmi_bios(output: &str) -> BiosInfo {
    let (mut vendor, mut version, mut date) = (None, None, None);
    for line in output.lines() {
        if let Some(v) = labeled_value(line, "Vendor") {
            first(&mut vendor, v);
        } else if let Some(v) = labeled_value(line, "Version") {
            first(&mut version, v);
        } else if let Some(v) = labeled_value(line, "Release Date") {
            first(&mut date, v);
        }
    }
    BiosInfo {
        vendor: vendor.flatten(),
        version: version.flatten(),
        date: date.flatten(),
    }
}

const SYSTEM_SLOT_HEADER: &str = "System Slot Information";

fn slot_length(value: &str) -> SlotLength {
    let value = value.to_ascii_lowercase();
    if value.contains("long") || value.contains("full") {
        SlotLength::Full
    } else if value.contains("short") || value.contains("half") {
        SlotLength::Short
    } else {
        SlotLength::Unknown
    }
}

/// Parse `dmidecode -t slot` into slot records.
///
/// An un-indented line starting with `Slot` (or the stock dmidecode
/// `System Slot Information` header) opens a record whose `slot` is the
/// header text. Indented fields before the first header are ignored.
pub fn parse_dmi_slots(output: &str) -> Vec<PcieSlot> {
    let mut slots = Vec::new();
    let mut current: Option<PcieSlot> = None;

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        if !indented && (line.starts_with("Slot") || line == SYSTEM_SLOT_HEADER) {
            slots.extend(current.take());
            current = Some(PcieSlot {
                slot: line.to_string(),
                ..PcieSlot::default()
            });
            continue;
        }

        let Some(slot) = current.as_mut() else {
            continue;
        };

        if let Some(v) = labeled_value(line, "Type") {
            slot.slot_type = v;
        } else if let Some(v) = labeled_value(line, "Length") {
            slot.length = Some(slot_length(v.as_deref().unwrap_or("")));
        } else if let Some(v) = labeled_value(line, "Bus Address") {
            slot.bus_address = v;
        } else if let Some(v) = labeled_value(line, "Current Usage") {
            let usage = v.unwrap_or_default().to_ascii_lowercase();
            slot.occupied = Some(usage != "available" && usage != "unavailable");
        } else if let Some(v) = labeled_value(line, "Data Bus Width") {
            slot.lanes = v;
        } else if let Some(v) = labeled_value(line, "Designation") {
            slot.designation = v;
        } else if let Some(v) = labeled_value(line, "Installed Device") {
            slot.device = v;
        }
    }
    slots.extend(current);

    slots
}
