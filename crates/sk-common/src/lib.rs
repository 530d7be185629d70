//! Spektor common types, schema versioning, and errors.
//!
//! This crate provides the types shared by the collection core and its
//! consumers:
//! - The host inventory [`Document`] and all of its sections
//! - The document schema version
//! - Common error types
//! - Output format specifications

pub mod document;
pub mod error;
pub mod output;

pub use document::{
    Buses, Collector, CpuSection, DebugInfo, Document, Firmware, GpuEntry, Host, Memory,
    MemoryModule, Meta, Motherboard, NetworkInterface, OsInfo, Packages, PciDevice, PcieSlot,
    SecureBoot, SlotLength, Slots, Software, StorageDevice, UsbDevice, COLLECTOR_TOOL,
    SCHEMA_VERSION,
};
pub use error::{Error, ErrorCategory, Result};
pub use output::OutputFormat;
