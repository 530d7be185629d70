//! Structural validation of inventory documents.
//!
//! Validation is soft: every problem becomes a message in the report and
//! the walk continues. Typed [`Document`]s can only fail on the schema
//! version, but JSON loaded from disk (`spektor validate FILE`) can be
//! arbitrarily malformed, so the checks run over `serde_json::Value`.

use serde::Serialize;
use serde_json::{Map, Value};
use sk_common::{Document, SCHEMA_VERSION};

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Map,
    List,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Kind::Map => value.is_object(),
            Kind::List => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Map => "object",
            Kind::List => "array",
        }
    }
}

const TOP_LEVEL: [(&str, Kind); 12] = [
    ("meta", Kind::Map),
    ("cpu", Kind::Map),
    ("memory", Kind::Map),
    ("motherboard", Kind::Map),
    ("firmware", Kind::Map),
    ("gpu", Kind::List),
    ("storage", Kind::List),
    ("network", Kind::List),
    ("slots", Kind::Map),
    ("buses", Kind::Map),
    ("software", Kind::Map),
    ("debug", Kind::Map),
];

const OS_FIELDS: [&str; 6] = ["name", "version", "id", "pretty_name", "kernel", "architecture"];

/// Validate a typed document.
pub fn validate(doc: &Document) -> ValidationReport {
    match serde_json::to_value(doc) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationReport::from_errors(vec![format!("Document not serializable: {e}")]),
    }
}

/// Validate arbitrary JSON against the document shape.
pub fn validate_value(value: &Value) -> ValidationReport {
    let Some(root) = value.as_object() else {
        return ValidationReport::from_errors(vec!["Document must be an object".to_string()]);
    };
    let mut errors = Vec::new();

    for (key, kind) in TOP_LEVEL {
        match root.get(key) {
            None => errors.push(format!("Missing key: {key}")),
            Some(v) if !kind.matches(v) => {
                errors.push(format!("{key} must be an {}", kind.name()));
            }
            Some(_) => {}
        }
    }

    if let Some(meta) = root.get("meta").and_then(Value::as_object) {
        check_meta(meta, &mut errors);
    }

    if let Some(slots) = root.get("slots").and_then(Value::as_object) {
        require_list(slots, "slots", "pcie", &mut errors);
    }

    if let Some(buses) = root.get("buses").and_then(Value::as_object) {
        require_list(buses, "buses", "pci", &mut errors);
        require_list(buses, "buses", "usb", &mut errors);
    }

    ValidationReport::from_errors(errors)
}

fn check_meta(meta: &Map<String, Value>, errors: &mut Vec<String>) {
    match meta.get("schema_version") {
        Some(Value::String(version)) if version != SCHEMA_VERSION => errors.push(format!(
            "Unsupported schema version: {version} (expected {SCHEMA_VERSION})"
        )),
        Some(Value::String(_)) => {}
        Some(_) => errors.push("meta.schema_version must be a string".to_string()),
        None => errors.push("Missing key: meta.schema_version".to_string()),
    }

    let Some(host) = meta.get("host") else {
        errors.push("Missing key: meta.host".to_string());
        return;
    };
    let Some(host) = host.as_object() else {
        errors.push("meta.host must be an object".to_string());
        return;
    };

    if !host.get("hostname").is_some_and(string_or_null) {
        errors.push("meta.host.hostname must be a string or null".to_string());
    }

    match host.get("os") {
        Some(Value::Object(os)) => {
            for field in OS_FIELDS {
                if !os.get(field).is_some_and(string_or_null) {
                    errors.push(format!("meta.host.os.{field} must be a string or null"));
                }
            }
        }
        _ => errors.push("meta.host.os must be an object".to_string()),
    }
}

fn string_or_null(value: &Value) -> bool {
    value.is_string() || value.is_null()
}

fn require_list(section: &Map<String, Value>, name: &str, key: &str, errors: &mut Vec<String>) {
    if !section.get(key).is_some_and(Value::is_array) {
        errors.push(format!("{name}.{key} must be an array"));
    }
}
