//! Memory parsers: `/proc/meminfo` and `dmidecode -t memory`.

use super::labeled_value;
use regex::Regex;
use sk_common::MemoryModule;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn meminfo_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+):\s+(\d+)\s*(\w+)?").expect("static meminfo pattern"))
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit.to_ascii_lowercase().as_str() {
        "" | "b" | "bytes" => Some(1),
        "kb" | "kib" => Some(1024),
        "mb" | "mib" => Some(1024 * 1024),
        "gb" | "gib" => Some(1024 * 1024 * 1024),
        "tb" | "tib" => Some(1024 * 1024 * 1024 * 1024),
        _ => None,
    }
}

/// Parse `/proc/meminfo` into byte counts.
///
/// Units are binary (`kB` = 1024). Lines without a unit are taken as-is
/// (e.g. `HugePages_Total`). Keys with parentheses such as `Active(anon)`
/// are skipped.
pub fn parse_meminfo(content: &str) -> BTreeMap<String, u64> {
    let mut values = BTreeMap::new();
    for line in content.lines() {
        let Some(caps) = meminfo_line().captures(line) else {
            continue;
        };
        let Ok(amount) = caps[2].parse::<u64>() else {
            continue;
        };
        let unit = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        let multiplier = unit_multiplier(unit).unwrap_or(1);
        values.insert(caps[1].to_string(), amount.saturating_mul(multiplier));
    }
    values
}

/// Parse a `"<number> <unit>"` size such as `"16 GB"` or `"8192 MB"`.
pub fn parse_size_with_unit(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let amount: u64 = parts.next()?.parse().ok()?;
    let multiplier = unit_multiplier(parts.next().unwrap_or(""))?;
    amount.checked_mul(multiplier)
}

/// dmidecode placeholder values that mean "no data".
fn meaningful(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        !matches!(
            v.as_str(),
            "Unknown" | "Not Specified" | "Not Provided" | "None" | "<OUT OF SPEC>"
        )
    })
}

fn push_installed(module: Option<MemoryModule>, modules: &mut Vec<MemoryModule>) {
    if let Some(m) = module.filter(|m| m.size_bytes.is_some()) {
        modules.push(m);
    }
}

/// Parse `dmidecode -t memory` into installed modules.
///
/// Only `Memory Device` records with a numeric size are kept; empty banks
/// (`No Module Installed`) are dropped.
pub fn parse_dmi_memory(output: &str) -> Vec<MemoryModule> {
    let mut modules = Vec::new();
    let mut current: Option<MemoryModule> = None;

    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) {
            if line.trim() == "Memory Device" {
                push_installed(current.take(), &mut modules);
                current = Some(MemoryModule::default());
            } else if !line.trim().is_empty() {
                push_installed(current.take(), &mut modules);
            }
            continue;
        }

        let Some(module) = current.as_mut() else {
            continue;
        };

        if let Some(v) = labeled_value(line, "Size") {
            module.size_bytes = v.as_deref().and_then(parse_size_with_unit);
        } else if let Some(v) = labeled_value(line, "Locator") {
            module.locator = meaningful(v);
        } else if let Some(v) = labeled_value(line, "Bank Locator") {
            module.bank_locator = meaningful(v);
        } else if let Some(v) = labeled_value(line, "Type") {
            module.kind = meaningful(v);
        } else if let Some(v) = labeled_value(line, "Speed") {
            module.speed = meaningful(v);
        } else if let Some(v) = labeled_value(line, "Manufacturer") {
            module.manufacturer = meaningful(v);
        } else if let Some(v) = labeled_value(line, "Part Number") {
            module.part_number = meaningful(v);
        }
    }
    push_installed(current.take(), &mut modules);

    modules
}
