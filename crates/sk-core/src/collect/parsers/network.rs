//! Network interface parser for `ip -j address`.

use serde_json::Value;
use sk_common::NetworkInterface;

/// Parse `ip -j address` output.
///
/// Each interface keeps its `local` addresses in order; `mac` comes from
/// the link-layer `address` and `state` from `operstate`.
pub fn parse_ip_addr_json(output: &str) -> Vec<NetworkInterface> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(output) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| {
            let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
            let addresses = entry
                .get("addr_info")
                .and_then(Value::as_array)
                .map(|infos| {
                    infos
                        .iter()
                        .filter_map(|info| info.get("local").and_then(Value::as_str))
                        .filter(|local| !local.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            NetworkInterface {
                ifname: text("ifname"),
                addresses,
                mac: text("address"),
                state: text("operstate"),
            }
        })
        .collect()
}
