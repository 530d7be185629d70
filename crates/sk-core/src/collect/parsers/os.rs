//! Operating system identity parsers.

use serde::{Deserialize, Serialize};

/// Identity fields from `/etc/os-release`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRelease {
    pub name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
    pub pretty_name: Option<String>,
}

/// Parse `/etc/os-release` content.
///
/// Keys are matched case-insensitively. `version` takes whichever of
/// `VERSION` / `VERSION_ID` appears first.
pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim()).to_string();

        match key.trim().to_ascii_lowercase().as_str() {
            "name" => release.name = Some(value),
            "version" | "version_id" => {
                if release.version.as_deref().is_none_or(str::is_empty) {
                    release.version = Some(value);
                }
            }
            "id" => release.id = Some(value),
            "pretty_name" => release.pretty_name = Some(value),
            _ => {}
        }
    }

    release
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

/// First line of command output or a small file, trimmed.
pub fn parse_first_line(content: &str) -> Option<String> {
    let line = content.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
