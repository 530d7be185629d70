//! Host inventory document.
//!
//! The [`Document`] is the single artifact produced by a collection run.
//! Its shape is fixed by [`SCHEMA_VERSION`]: every section and every declared
//! nested key is always serialized, using `null`, `[]` or `{}` when a probe
//! produced no data. Consumers branch on null values, never on key absence.
//!
//! `Document::default()` is the skeleton. A collection run starts from it and
//! fills sections in place as probes complete.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the document shape. Bump on any field addition or removal.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Tool name recorded in `meta.collector.tool`.
pub const COLLECTOR_TOOL: &str = "spektor";

/// Complete host inventory document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Document {
    pub meta: Meta,
    pub cpu: CpuSection,
    pub memory: Memory,
    pub motherboard: Motherboard,
    pub firmware: Firmware,
    pub gpu: Vec<GpuEntry>,
    pub storage: Vec<StorageDevice>,
    pub network: Vec<NetworkInterface>,
    pub slots: Slots,
    pub buses: Buses,
    pub software: Software,
    pub debug: DebugInfo,
}

impl Document {
    /// Create a fresh skeleton document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach validation errors to the debug section.
    ///
    /// An empty error list clears any previously recorded errors.
    pub fn record_validation(&mut self, errors: Vec<String>) {
        self.debug.validation_errors = if errors.is_empty() {
            None
        } else {
            Some(errors)
        };
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Run metadata and host identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Meta {
    pub schema_version: String,
    /// RFC 3339 UTC timestamp, second precision.
    pub generated_at: Option<String>,
    pub host: Host,
    pub collector: Collector,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: None,
            host: Host::default(),
            collector: Collector::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Host {
    pub hostname: Option<String>,
    pub os: OsInfo,
}

/// Operating system descriptor, mostly from `/etc/os-release`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OsInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
    pub pretty_name: Option<String>,
    pub kernel: Option<String>,
    pub architecture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Collector {
    pub tool: String,
    pub version: String,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            tool: COLLECTOR_TOOL.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CpuSection {
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub sockets: Option<u32>,
    /// Physical cores across all sockets.
    pub cores: Option<u32>,
    pub threads_per_core: Option<u32>,
    pub logical_processors: Option<u32>,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Memory {
    pub total_bytes: Option<u64>,
    pub swap_bytes: Option<u64>,
    pub modules: Vec<MemoryModule>,
}

/// One populated DIMM slot from `dmidecode -t memory`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MemoryModule {
    pub locator: Option<String>,
    pub bank_locator: Option<String>,
    pub size_bytes: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub speed: Option<String>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Motherboard {
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Firmware {
    pub bios_vendor: Option<String>,
    pub bios_version: Option<String>,
    pub bios_date: Option<String>,
    pub tpm_present: Option<bool>,
    pub secure_boot: SecureBoot,
}

/// UEFI Secure Boot state as reported by `mokutil`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SecureBoot {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

/// Display adapter derived from a PCI entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GpuEntry {
    pub name: Option<String>,
    pub vendor: Option<String>,
    /// PCI slot address.
    pub bus: Option<String>,
}

/// Block device or partition, flattened from the `lsblk` tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StorageDevice {
    pub name: Option<String>,
    pub size_bytes: Option<u64>,
    /// Rotational media.
    pub rota: Option<bool>,
    /// Transport (sata, nvme, usb, ...).
    pub tran: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub mountpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NetworkInterface {
    pub ifname: Option<String>,
    pub addresses: Vec<String>,
    pub mac: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Slots {
    pub pcie: Vec<PcieSlot>,
}

/// Expansion slot from `dmidecode -t slot`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PcieSlot {
    /// Section header text, e.g. "System Slot Information".
    pub slot: String,
    #[serde(rename = "type")]
    pub slot_type: Option<String>,
    pub length: Option<SlotLength>,
    pub bus_address: Option<String>,
    pub occupied: Option<bool>,
    /// Data bus width, e.g. "x16".
    pub lanes: Option<String>,
    pub designation: Option<String>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotLength {
    Full,
    Short,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Buses {
    pub pci: Vec<PciDevice>,
    pub usb: Vec<UsbDevice>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PciDevice {
    pub slot: String,
    pub class: Option<String>,
    pub vendor: Option<String>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct UsbDevice {
    pub bus: String,
    pub device: String,
    /// `vendor:product` hex pair.
    pub id: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Software {
    /// Name of PID 1.
    pub init: Option<String>,
    pub packages: Packages,
    /// Runtime name to its version banner.
    pub runtimes: BTreeMap<String, String>,
    /// Opt-in extra listings (docker, systemd, kvm), raw lines.
    pub extras: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Packages {
    pub manager: Option<String>,
    pub items: Vec<String>,
    pub truncated: bool,
}

/// Diagnostic side information. Serializes as `{}` when nothing was recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}
