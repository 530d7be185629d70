//! Software inventory parsers: package lists, runtime versions, Secure Boot.

use sk_common::{Packages, SecureBoot};
use std::fmt;

/// Default cap on reported package items.
pub const DEFAULT_PACKAGE_LIMIT: usize = 2000;

/// Supported package managers, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Dpkg,
    Rpm,
    Pacman,
}

impl PackageManager {
    pub const ALL: [PackageManager; 3] =
        [PackageManager::Dpkg, PackageManager::Rpm, PackageManager::Pacman];

    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Dpkg => "dpkg",
            PackageManager::Rpm => "rpm",
            PackageManager::Pacman => "pacman",
        }
    }

    /// Probe (and artifact) name for this manager's listing.
    pub fn probe_name(&self) -> &'static str {
        match self {
            PackageManager::Dpkg => "packages_dpkg",
            PackageManager::Rpm => "packages_rpm",
            PackageManager::Pacman => "packages_pacman",
        }
    }

    /// Command line listing installed packages.
    pub fn argv(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Dpkg => &["dpkg", "-l"],
            PackageManager::Rpm => &["rpm", "-qa"],
            PackageManager::Pacman => &["pacman", "-Q"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trimmed, non-empty lines.
pub fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a package listing into at most `limit` items.
///
/// `dpkg -l` rows become `"name version"` with the table header and its
/// `|` legend lines dropped;
/// `rpm -qa` and `pacman -Q` lines are kept verbatim.
pub fn parse_package_list(manager: PackageManager, output: &str, limit: usize) -> Packages {
    let lines = non_empty_lines(output);
    let mut items: Vec<String> = match manager {
        PackageManager::Dpkg => lines
            .iter()
            .filter(|line| {
                !(line.starts_with("Desired=") || line.starts_with('|') || line.starts_with("+++"))
            })
            .filter_map(|line| {
                let mut cols = line.split_whitespace();
                let _status = cols.next()?;
                let name = cols.next()?;
                let version = cols.next()?;
                Some(format!("{name} {version}"))
            })
            .collect(),
        PackageManager::Rpm | PackageManager::Pacman => lines,
    };

    let truncated = items.len() > limit;
    items.truncate(limit);

    Packages {
        manager: Some(manager.name().to_string()),
        items,
        truncated,
    }
}

/// Parse `mokutil --sb-state`.
pub fn parse_secure_boot(output: &str) -> SecureBoot {
    let text = output.to_ascii_lowercase();
    if text.contains("enabled") {
        SecureBoot::Enabled
    } else if text.contains("disabled") {
        SecureBoot::Disabled
    } else {
        SecureBoot::Unknown
    }
}

/// First line of a `--version` style answer, from stdout or else stderr.
///
/// Some runtimes (`java -version`) print to stderr.
pub fn parse_version_line(stdout: &str, stderr: &str) -> Option<String> {
    [stdout, stderr]
        .into_iter()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .and_then(|text| text.lines().next())
        .map(|line| line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DPKG: &str = "Desired=Unknown/Install/Remove/Purge/Hold
| Status=Not/Inst/Conf-files/Unpacked/halF-conf/Half-inst/trig-aWait/Trig-pend
|/ Err?=(none)/Reinst-required (Status,Err: uppercase=bad)
||/ Name           Version        Architecture Description
+++-==============-==============-============-=================================
ii  adduser        3.134          all          add and remove users and groups
ii  apt            2.6.1          amd64        commandline package manager
ii  bash           5.2.15-2+b7    amd64        GNU Bourne Again SHell
";

    #[test]
    fn test_parse_dpkg() {
        let packages = parse_package_list(PackageManager::Dpkg, DPKG, DEFAULT_PACKAGE_LIMIT);
        assert_eq!(packages.manager.as_deref(), Some("dpkg"));
        assert!(!packages.truncated);
        assert_eq!(
            packages.items,
            vec!["adduser 3.134", "apt 2.6.1", "bash 5.2.15-2+b7"]
        );
    }

    #[test]
    fn test_parse_rpm_and_pacman_verbatim() {
        let rpm = parse_package_list(PackageManager::Rpm, "bash-5.2.26-3.fc40.x86_64\n\nglibc-2.39-8.fc40.x86_64\n", 10);
        assert_eq!(rpm.items, vec!["bash-5.2.26-3.fc40.x86_64", "glibc-2.39-8.fc40.x86_64"]);

        let pacman = parse_package_list(PackageManager::Pacman, "linux 6.9.3.arch1-1\n", 10);
        assert_eq!(pacman.manager.as_deref(), Some("pacman"));
        assert_eq!(pacman.items, vec!["linux 6.9.3.arch1-1"]);
    }

    #[test]
    fn test_package_limit() {
        let output: String = (0..25).map(|i| format!("pkg-{i}\n")).collect();
        let packages = parse_package_list(PackageManager::Rpm, &output, 20);
        assert_eq!(packages.items.len(), 20);
        assert!(packages.truncated);
        assert_eq!(packages.items[19], "pkg-19");

        let exact = parse_package_list(PackageManager::Rpm, &output, 25);
        assert!(!exact.truncated);
    }

    #[test]
    fn test_parse_secure_boot() {
        assert_eq!(parse_secure_boot("SecureBoot enabled\n"), SecureBoot::Enabled);
        assert_eq!(parse_secure_boot("SecureBoot disabled\nPlatform is in Setup Mode\n"), SecureBoot::Disabled);
        assert_eq!(parse_secure_boot("EFI variables are not supported on this system\n"), SecureBoot::Unknown);
        assert_eq!(parse_secure_boot(""), SecureBoot::Unknown);
    }

    #[test]
    fn test_parse_version_line() {
        assert_eq!(parse_version_line("Python 3.11.2\n", ""), Some("Python 3.11.2".into()));
        assert_eq!(
            parse_version_line("", "openjdk version \"17.0.11\" 2024-04-16\nOpenJDK Runtime Environment\n"),
            Some("openjdk version \"17.0.11\" 2024-04-16".into())
        );
        assert_eq!(parse_version_line("  \n", " "), None);
        assert_eq!(parse_version_line("\nv20.12.2\n", ""), Some("v20.12.2".into()));
    }

    #[test]
    fn test_non_empty_lines() {
        assert_eq!(non_empty_lines(" a \n\n b\n"), vec!["a", "b"]);
        assert!(non_empty_lines("").is_empty());
    }
}
