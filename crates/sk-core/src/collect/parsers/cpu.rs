//! CPU parsers: `lscpu -J` and `/proc/cpuinfo`.
//!
//! Both sources reduce to a flat label → value map ([`CpuFacts`]), which
//! [`cpu_section_from_facts`] turns into the document's CPU section.

use super::int_from;
use serde_json::Value;
use sk_common::CpuSection;
use std::collections::BTreeMap;

/// Flat label → value map from either CPU source.
pub type CpuFacts = BTreeMap<String, String>;

/// Key added by [`parse_cpuinfo`] holding the processor block count.
pub const PROCESSOR_COUNT_KEY: &str = "processor_count";

/// Parse `lscpu -J` output.
///
/// Newer util-linux nests related fields under `children`; those are
/// flattened into the same map. The first occurrence of a label wins.
pub fn parse_lscpu_json(output: &str) -> CpuFacts {
    let mut facts = CpuFacts::new();
    let Ok(payload) = serde_json::from_str::<Value>(output) else {
        return facts;
    };
    if let Some(entries) = payload.get("lscpu").and_then(Value::as_array) {
        collect_lscpu_entries(entries, &mut facts);
    }
    facts
}

fn collect_lscpu_entries(entries: &[Value], facts: &mut CpuFacts) {
    for entry in entries {
        let field = entry
            .get("field")
            .and_then(Value::as_str)
            .map(|f| f.trim().trim_matches(':').trim())
            .unwrap_or_default();

        let data = match entry.get("data") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        if let (false, Some(data)) = (field.is_empty(), data) {
            facts.entry(field.to_string()).or_insert(data);
        }

        if let Some(children) = entry.get("children").and_then(Value::as_array) {
            collect_lscpu_entries(children, facts);
        }
    }
}

/// Parse `/proc/cpuinfo`.
///
/// Fields come from the first processor block; `processor_count` is the
/// number of non-empty blocks (0 for empty input).
pub fn parse_cpuinfo(content: &str) -> CpuFacts {
    let mut facts = CpuFacts::new();
    let blocks: Vec<&str> = content
        .trim()
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .collect();

    if let Some(first) = blocks.first() {
        for line in first.lines() {
            if let Some((key, value)) = line.split_once(':') {
                facts.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    facts.insert(PROCESSOR_COUNT_KEY.to_string(), blocks.len().to_string());
    facts
}

fn first_of<'a>(facts: &'a CpuFacts, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| facts.get(*k))
        .map(String::as_str)
        .find(|v| !v.is_empty())
}

/// Build the CPU section from parsed facts.
///
/// `cores` is `sockets × cores per socket` when both are known and
/// non-zero, else cores per socket, else the logical processor count.
pub fn cpu_section_from_facts(facts: &CpuFacts) -> CpuSection {
    let int = |key: &str| facts.get(key).and_then(|v| int_from(v)).filter(|n| *n > 0);

    let sockets = int("Socket(s)");
    let cores_per_socket = int("Core(s) per socket");
    let threads_per_core = int("Thread(s) per core");
    let logical = int("CPU(s)").or_else(|| int(PROCESSOR_COUNT_KEY));

    let cores = match (sockets, cores_per_socket) {
        (Some(s), Some(c)) => s.checked_mul(c),
        _ => cores_per_socket.or(logical),
    };

    let flags = first_of(facts, &["Flags", "flags"])
        .map(|f| f.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    CpuSection {
        model: first_of(facts, &["Model name", "model name"]).map(str::to_string),
        vendor: first_of(facts, &["Vendor ID", "vendor_id"]).map(str::to_string),
        sockets,
        cores,
        threads_per_core,
        logical_processors: logical,
        flags,
    }
}
