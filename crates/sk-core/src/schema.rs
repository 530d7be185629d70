//! JSON Schema generation for spektor output types.
//!
//! # Usage
//!
//! ```bash
//! # Schema of the inventory document
//! spektor schema
//!
//! # List available schema types
//! spektor schema --list
//!
//! # Schema for a specific type
//! spektor schema CollectConfig
//! ```

use crate::config::CollectConfig;
use schemars::schema_for;
use serde_json::Value;
use sk_common::{
    CpuSection, Document, Firmware, Memory, NetworkInterface, PcieSlot, Software, StorageDevice,
};
use std::collections::BTreeMap;

/// Name of the schema printed when no type is requested.
pub const DEFAULT_SCHEMA: &str = "Document";

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Document", "Complete host inventory document"),
        ("CpuSection", "Processor identity and topology"),
        ("Memory", "Installed memory and DIMM modules"),
        ("Firmware", "BIOS, TPM and Secure Boot state"),
        ("StorageDevice", "Block device flattened from lsblk"),
        ("NetworkInterface", "Network interface and its addresses"),
        ("PcieSlot", "Expansion slot from dmidecode"),
        ("Software", "Init system, packages, runtimes and extras"),
        ("CollectConfig", "spektor.toml collection settings"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns None if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "Document" => schema_for!(Document),
        "CpuSection" => schema_for!(CpuSection),
        "Memory" => schema_for!(Memory),
        "Firmware" => schema_for!(Firmware),
        "StorageDevice" => schema_for!(StorageDevice),
        "NetworkInterface" => schema_for!(NetworkInterface),
        "PcieSlot" => schema_for!(PcieSlot),
        "Software" => schema_for!(Software),
        "CollectConfig" => schema_for!(CollectConfig),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|schema| (name.to_string(), schema)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _desc) in available_schemas() {
            assert!(generate_schema(name).is_some(), "Schema for '{}' should generate", name);
        }
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("UnknownType").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_document_schema_lists_sections() {
        let schema = generate_schema(DEFAULT_SCHEMA).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for key in ["meta", "cpu", "slots", "buses", "software", "debug"] {
            assert!(properties.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_generate_all_schemas() {
        let all = generate_all_schemas();
        assert_eq!(all.len(), available_schemas().len());
        assert!(all.contains_key("CollectConfig"));
    }
}
