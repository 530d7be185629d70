//! Block device parser for `lsblk -J -O -b`.

use serde_json::Value;
use sk_common::StorageDevice;

/// Parse `lsblk` JSON into a flat device list.
///
/// The tree is walked depth-first with children emitted before their
/// parent, so partitions precede their disk.
pub fn parse_lsblk_json(output: &str) -> Vec<StorageDevice> {
    let Ok(payload) = serde_json::from_str::<Value>(output) else {
        return Vec::new();
    };
    let mut devices = Vec::new();
    if let Some(roots) = payload.get("blockdevices").and_then(Value::as_array) {
        for root in roots {
            flatten_device(root, &mut devices);
        }
    }
    devices
}

fn flatten_device(node: &Value, out: &mut Vec<StorageDevice>) {
    if !node.is_object() {
        return;
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            flatten_device(child, out);
        }
    }
    out.push(StorageDevice {
        name: string_field(node, "name"),
        size_bytes: node.get("size").and_then(parse_size),
        rota: node.get("rota").and_then(parse_flag),
        tran: string_field(node, "tran"),
        model: string_field(node, "model"),
        serial: string_field(node, "serial"),
        mountpoints: mountpoints(node),
    });
}

fn string_field(node: &Value, key: &str) -> Option<String> {
    node.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn mountpoints(node: &Value) -> Vec<String> {
    match node.get("mountpoints") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => string_field(node, "mountpoint").into_iter().collect(),
    }
}

/// Size as a byte count: a JSON number, a numeric string, or a
/// human-readable size such as `"931.5G"` (binary multiples).
fn parse_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => parse_size_str(s),
        _ => None,
    }
}

fn parse_size_str(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let split = s.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (number, suffix) = s.split_at(split);
    let number: f64 = number.parse().ok()?;
    let exponent = match suffix.trim().trim_end_matches("iB").trim_end_matches('B') {
        "" => 0,
        "K" | "k" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        "P" => 5,
        "E" => 6,
        _ => return None,
    };
    Some((number * 1024f64.powi(exponent)).round() as u64)
}

/// Rotational flag: a JSON bool, `0`/`1`, or `"0"`/`"1"`.
fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSBLK: &str = r#"{
   "blockdevices": [
      {"name": "nvme0n1", "size": 512110190592, "rota": false, "tran": "nvme",
       "model": "Samsung SSD 970 EVO Plus 500GB", "serial": "S4EVNX0N123456",
       "mountpoints": [null],
       "children": [
          {"name": "nvme0n1p1", "size": 536870912, "rota": false, "tran": null,
           "model": null, "serial": null, "mountpoints": ["/boot/efi"]},
          {"name": "nvme0n1p2", "size": 511571197952, "rota": false, "tran": null,
           "model": null, "serial": null, "mountpoints": ["/", "/home"]}
       ]},
      {"name": "sda", "size": "2000398934016", "rota": "1", "tran": "sata",
       "model": "ST2000DM008-2FR1", "serial": "ZFL1ABCD", "mountpoint": "/data"}
   ]
}"#;

    #[test]
    fn test_children_before_parent() {
        let devices = parse_lsblk_json(LSBLK);
        let names: Vec<_> = devices.iter().map(|d| d.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["nvme0n1p1", "nvme0n1p2", "nvme0n1", "sda"]);
    }

    #[test]
    fn test_device_fields() {
        let devices = parse_lsblk_json(LSBLK);
        let disk = &devices[2];
        assert_eq!(disk.size_bytes, Some(512110190592));
        assert_eq!(disk.rota, Some(false));
        assert_eq!(disk.tran.as_deref(), Some("nvme"));
        assert_eq!(disk.serial.as_deref(), Some("S4EVNX0N123456"));
        assert!(disk.mountpoints.is_empty());

        assert_eq!(devices[1].mountpoints, vec!["/", "/home"]);
        assert_eq!(devices[1].tran, None);

        let hdd = &devices[3];
        assert_eq!(hdd.size_bytes, Some(2000398934016));
        assert_eq!(hdd.rota, Some(true));
        assert_eq!(hdd.mountpoints, vec!["/data"]);
    }

    #[test]
    fn test_human_readable_sizes() {
        assert_eq!(parse_size_str("512"), Some(512));
        assert_eq!(parse_size_str("1K"), Some(1024));
        assert_eq!(parse_size_str("931.5G"), Some(1_000_190_509_056));
        assert_eq!(parse_size_str("2TiB"), Some(2 * 1024u64.pow(4)));
        assert_eq!(parse_size_str("lots"), None);
        assert_eq!(parse_size_str("12 parsecs"), None);
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_lsblk_json("").is_empty());
        assert!(parse_lsblk_json("{").is_empty());
        assert!(parse_lsblk_json(r#"{"blockdevices": {}}"#).is_empty());
        assert!(parse_lsblk_json(r#"[1, 2]"#).is_empty());
    }

    #[test]
    fn test_non_object_nodes_skipped() {
        let devices = parse_lsblk_json(r#"{"blockdevices": [1, "x", {"name": "loop0"}]}"#);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name.as_deref(), Some("loop0"));
        assert_eq!(devices[0].size_bytes, None);
        assert_eq!(devices[0].rota, None);
    }
}
