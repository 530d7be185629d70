//! Document builder: runs the fixed probe battery and assembles a [`Document`].
//!
//! Probes run strictly in sequence through a [`CommandExecutor`]. A probe
//! that fails (non-zero exit, missing tool, timeout) leaves its section at
//! the skeleton default and collection moves on. The finished document is
//! validated and any problems are recorded under `debug.validation_errors`.

use super::parsers::{
    cpu_section_from_facts, gpus_from_pci, parse_cpuinfo, parse_dmi_baseboard, parse_dmi_bios,
    parse_dmi_memory, parse_dmi_slots, parse_first_line, parse_ip_addr_json, parse_lscpu_json,
    parse_lsblk_json, parse_lspci_mm, parse_lsusb, parse_meminfo, parse_os_release,
    parse_package_list, parse_secure_boot, parse_version_line, non_empty_lines, PackageManager,
    DEFAULT_PACKAGE_LIMIT,
};
use super::runner::{CommandExecutor, ProbeResult, ProbeRunner};
use super::tool_runner::DEFAULT_TIMEOUT_SECS;
use crate::config::CollectConfig;
use crate::logging::generate_run_id;
use crate::validate::validate;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sk_bundle::ArtifactWriter;
use sk_common::{Document, Packages, SecureBoot};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout for the firmware side probes (`dmesg`, `mokutil`).
pub const FIRMWARE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A named probe: artifact stem, command line and the section it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeSpec {
    pub name: &'static str,
    pub argv: &'static [&'static str],
    pub section: &'static str,
}

impl ProbeSpec {
    const fn new(name: &'static str, argv: &'static [&'static str], section: &'static str) -> Self {
        Self { name, argv, section }
    }

    pub fn program(&self) -> &'static str {
        self.argv.first().copied().unwrap_or_default()
    }
}

pub const UNAME_R: ProbeSpec = ProbeSpec::new("uname_r", &["uname", "-r"], "meta");
pub const UNAME_M: ProbeSpec = ProbeSpec::new("uname_m", &["uname", "-m"], "meta");
pub const LSCPU: ProbeSpec = ProbeSpec::new("lscpu", &["lscpu", "-J"], "cpu");
pub const CPUINFO: ProbeSpec = ProbeSpec::new("cpuinfo", &["cat", "/proc/cpuinfo"], "cpu");
pub const MEMINFO: ProbeSpec = ProbeSpec::new("meminfo", &["cat", "/proc/meminfo"], "memory");
pub const DMI_MEMORY: ProbeSpec =
    ProbeSpec::new("dmidecode_memory", &["dmidecode", "-t", "memory"], "memory");
pub const DMI_BASEBOARD: ProbeSpec =
    ProbeSpec::new("dmidecode_baseboard", &["dmidecode", "-t", "baseboard"], "motherboard");
pub const DMI_BIOS: ProbeSpec =
    ProbeSpec::new("dmidecode_bios", &["dmidecode", "-t", "bios"], "firmware");
pub const LSPCI: ProbeSpec = ProbeSpec::new("lspci", &["lspci", "-mm"], "buses");
pub const LSUSB: ProbeSpec = ProbeSpec::new("lsusb", &["lsusb"], "buses");
pub const LSBLK: ProbeSpec = ProbeSpec::new("lsblk", &["lsblk", "-J", "-O", "-b"], "storage");
pub const IP_ADDR: ProbeSpec = ProbeSpec::new("ip_addr", &["ip", "-j", "address"], "network");
pub const DOCKER_PS: ProbeSpec = ProbeSpec::new(
    "docker_ps",
    &["docker", "ps", "-a", "--format", "{{json .}}"],
    "software",
);
pub const DOCKER_IMAGES: ProbeSpec = ProbeSpec::new(
    "docker_images",
    &["docker", "images", "--format", "{{json .}}"],
    "software",
);
pub const SYSTEMCTL: ProbeSpec =
    ProbeSpec::new("systemctl", &["systemctl", "list-unit-files"], "software");
pub const VIRSH: ProbeSpec = ProbeSpec::new("virsh", &["virsh", "list", "--all"], "software");
pub const DMESG: ProbeSpec = ProbeSpec::new("dmesg", &["dmesg", "--ctime"], "firmware");
pub const MOKUTIL: ProbeSpec = ProbeSpec::new("mokutil", &["mokutil", "--sb-state"], "firmware");
pub const DMI_SLOTS: ProbeSpec =
    ProbeSpec::new("dmidecode_slots", &["dmidecode", "-t", "slot"], "slots");

/// Runtime probes in order. `python_fallback` reports under `python`.
pub const RUNTIMES: [(&str, ProbeSpec); 6] = [
    ("python", ProbeSpec::new("python", &["python3", "--version"], "software")),
    ("python", ProbeSpec::new("python_fallback", &["python", "--version"], "software")),
    ("node", ProbeSpec::new("node", &["node", "-v"], "software")),
    ("java", ProbeSpec::new("java", &["java", "-version"], "software")),
    ("docker", ProbeSpec::new("docker", &["docker", "--version"], "software")),
    ("podman", ProbeSpec::new("podman", &["podman", "--version"], "software")),
];

/// Every probe the builder may run, in execution order.
pub fn probe_catalog() -> Vec<ProbeSpec> {
    let mut probes = vec![
        UNAME_R,
        UNAME_M,
        LSCPU,
        CPUINFO,
        MEMINFO,
        DMI_MEMORY,
        DMI_BASEBOARD,
        DMI_BIOS,
        LSPCI,
        LSUSB,
        LSBLK,
        IP_ADDR,
    ];
    probes.extend(
        PackageManager::ALL
            .iter()
            .map(|m| ProbeSpec::new(m.probe_name(), m.argv(), "software")),
    );
    probes.extend(RUNTIMES.iter().map(|(_, spec)| *spec));
    probes.extend([DOCKER_PS, DOCKER_IMAGES, SYSTEMCTL, VIRSH, DMESG, MOKUTIL, DMI_SLOTS]);
    probes
}

/// Inputs to one collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Timeout applied to every regular probe.
    pub timeout: Duration,
    pub package_limit: usize,
    /// Opt-in probe groups: `docker`, `systemd`, `kvm`.
    pub extras: Vec<String>,
    pub os_release_path: PathBuf,
    pub init_comm_path: PathBuf,
    pub tpm_class_dir: PathBuf,
    /// Overrides the detected hostname.
    pub hostname: Option<String>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::from_config(&CollectConfig::default())
    }
}

impl CollectOptions {
    pub fn from_config(config: &CollectConfig) -> Self {
        Self {
            timeout: config.timeout(),
            package_limit: config.package_limit,
            extras: config.extras.clone(),
            os_release_path: config.os_release_path.clone(),
            init_comm_path: config.init_comm_path.clone(),
            tpm_class_dir: config.tpm_class_dir.clone(),
            hostname: None,
        }
    }
}

/// Hostname of this machine, if the OS reports one.
pub fn local_hostname() -> Option<String> {
    hostname::get().ok().and_then(|h| h.into_string().ok())
}

/// Current time as RFC 3339 UTC with second precision.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn run(exec: &mut dyn CommandExecutor, spec: &ProbeSpec, timeout: Duration) -> ProbeResult {
    exec.execute(spec.name, spec.argv, Some(timeout))
}

/// Stdout of `spec` when it exits 0.
fn run_ok(exec: &mut dyn CommandExecutor, spec: &ProbeSpec, timeout: Duration) -> Option<String> {
    let result = run(exec, spec, timeout);
    result.success().then_some(result.stdout)
}

/// Run every probe through `exec` and build the inventory document.
///
/// Never fails: each probe that produces nothing leaves its section at the
/// skeleton default.
pub fn collect(options: &CollectOptions, exec: &mut dyn CommandExecutor) -> Document {
    let timeout = if options.timeout.is_zero() {
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    } else {
        options.timeout
    };
    let mut doc = Document::new();

    doc.meta.generated_at = Some(now_rfc3339());
    doc.meta.host.hostname = options.hostname.clone().or_else(local_hostname);

    collect_os(&mut doc, options, exec, timeout);
    collect_cpu(&mut doc, exec, timeout);
    collect_memory(&mut doc, exec, timeout);

    if let Some(out) = run_ok(exec, &DMI_BASEBOARD, timeout) {
        doc.motherboard = parse_dmi_baseboard(&out);
    }
    if let Some(out) = run_ok(exec, &DMI_BIOS, timeout) {
        let bios = parse_dmi_bios(&out);
        doc.firmware.bios_vendor = bios.vendor;
        doc.firmware.bios_version = bios.version;
        doc.firmware.bios_date = bios.date;
    }

    if let Some(out) = run_ok(exec, &LSPCI, timeout) {
        doc.buses.pci = parse_lspci_mm(&out);
    }
    if let Some(out) = run_ok(exec, &LSUSB, timeout) {
        doc.buses.usb = parse_lsusb(&out);
    }
    doc.gpu = gpus_from_pci(&doc.buses.pci);

    if let Some(out) = run_ok(exec, &LSBLK, timeout) {
        doc.storage = parse_lsblk_json(&out);
    }

    if exec.is_available(IP_ADDR.program()) {
        if let Some(out) = run_ok(exec, &IP_ADDR, timeout) {
            doc.network = parse_ip_addr_json(&out);
        }
    }

    doc.software.init = std::fs::read_to_string(&options.init_comm_path)
        .ok()
        .and_then(|comm| parse_first_line(&comm));
    doc.software.packages = collect_packages(exec, timeout, options.package_limit);
    doc.software.runtimes = collect_runtimes(exec, timeout);
    doc.software.extras = collect_extras(exec, timeout, &options.extras);

    doc.firmware.tpm_present = Some(detect_tpm(exec, &options.tpm_class_dir));
    doc.firmware.secure_boot = detect_secure_boot(exec);

    if let Some(out) = run_ok(exec, &DMI_SLOTS, timeout) {
        doc.slots.pcie = parse_dmi_slots(&out);
    }

    if let Some(dir) = exec.artifacts_dir() {
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        doc.debug.artifacts_dir = Some(dir.display().to_string());
    }

    let report = validate(&doc);
    if !report.valid {
        warn!(errors = report.errors.len(), "collected document failed validation");
        doc.record_validation(report.errors);
    }

    doc
}

fn collect_os(
    doc: &mut Document,
    options: &CollectOptions,
    exec: &mut dyn CommandExecutor,
    timeout: Duration,
) {
    let os = &mut doc.meta.host.os;
    match std::fs::read_to_string(&options.os_release_path) {
        Ok(content) => {
            let release = parse_os_release(&content);
            os.name = release.name;
            os.version = release.version;
            os.id = release.id;
            os.pretty_name = release.pretty_name;
        }
        Err(e) => {
            debug!(path = %options.os_release_path.display(), error = %e, "os-release unreadable");
        }
    }

    if let Some(out) = run_ok(exec, &UNAME_R, timeout) {
        os.kernel = parse_first_line(&out);
    }
    if let Some(out) = run_ok(exec, &UNAME_M, timeout) {
        os.architecture = parse_first_line(&out);
    }
}

fn collect_cpu(doc: &mut Document, exec: &mut dyn CommandExecutor, timeout: Duration) {
    let mut facts = run_ok(exec, &LSCPU, timeout)
        .map(|out| parse_lscpu_json(&out))
        .unwrap_or_default();

    if facts.is_empty() {
        debug!("lscpu yielded nothing, falling back to /proc/cpuinfo");
        if let Some(out) = run_ok(exec, &CPUINFO, timeout) {
            facts = parse_cpuinfo(&out);
        }
    }

    if !facts.is_empty() {
        doc.cpu = cpu_section_from_facts(&facts);
    }
}

fn collect_memory(doc: &mut Document, exec: &mut dyn CommandExecutor, timeout: Duration) {
    if let Some(out) = run_ok(exec, &MEMINFO, timeout) {
        let meminfo = parse_meminfo(&out);
        doc.memory.total_bytes = meminfo.get("MemTotal").copied();
        doc.memory.swap_bytes = meminfo.get("SwapTotal").copied();
    }
    if let Some(out) = run_ok(exec, &DMI_MEMORY, timeout) {
        doc.memory.modules = parse_dmi_memory(&out);
    }
}

/// First available package manager that answers with a non-empty listing.
fn collect_packages(exec: &mut dyn CommandExecutor, timeout: Duration, limit: usize) -> Packages {
    let limit = if limit == 0 { DEFAULT_PACKAGE_LIMIT } else { limit };
    for manager in PackageManager::ALL {
        let spec = ProbeSpec::new(manager.probe_name(), manager.argv(), "software");
        if !exec.is_available(spec.program()) {
            continue;
        }
        let Some(out) = run_ok(exec, &spec, timeout) else {
            continue;
        };
        if out.trim().is_empty() {
            continue;
        }
        let packages = parse_package_list(manager, &out, limit);
        info!(
            manager = %manager,
            items = packages.items.len(),
            truncated = packages.truncated,
            "package inventory collected"
        );
        return packages;
    }
    Packages::default()
}

fn collect_runtimes(exec: &mut dyn CommandExecutor, timeout: Duration) -> BTreeMap<String, String> {
    let mut runtimes = BTreeMap::new();
    for (key, spec) in &RUNTIMES {
        if runtimes.contains_key(*key) || !exec.is_available(spec.program()) {
            continue;
        }
        let result = run(exec, spec, timeout);
        if !result.success() {
            continue;
        }
        if let Some(version) = parse_version_line(&result.stdout, &result.stderr) {
            runtimes.insert(key.to_string(), version);
        }
    }
    runtimes
}

fn collect_extras(
    exec: &mut dyn CommandExecutor,
    timeout: Duration,
    extras: &[String],
) -> BTreeMap<String, Vec<String>> {
    let mut payload = BTreeMap::new();
    for item in extras {
        match item.as_str() {
            "docker" if exec.is_available("docker") => {
                if let Some(out) = run_ok(exec, &DOCKER_PS, timeout) {
                    payload.insert("docker_containers".to_string(), non_empty_lines(&out));
                }
                if let Some(out) = run_ok(exec, &DOCKER_IMAGES, timeout) {
                    payload.insert("docker_images".to_string(), non_empty_lines(&out));
                }
            }
            "systemd" if exec.is_available(SYSTEMCTL.program()) => {
                if let Some(out) = run_ok(exec, &SYSTEMCTL, timeout) {
                    payload.insert("systemd_unit_files".to_string(), raw_lines(&out));
                }
            }
            "kvm" if exec.is_available(VIRSH.program()) => {
                if let Some(out) = run_ok(exec, &VIRSH, timeout) {
                    payload.insert("kvm_guests".to_string(), raw_lines(&out));
                }
            }
            "docker" | "systemd" | "kvm" => {
                debug!(extra = %item, "extra requested but its tool is unavailable");
            }
            other => debug!(extra = %other, "ignoring unknown extra"),
        }
    }
    payload
}

fn raw_lines(output: &str) -> Vec<String> {
    output.lines().map(str::to_string).collect()
}

/// TPM present when the sysfs class directory has entries, else when the
/// kernel log mentions one.
fn detect_tpm(exec: &mut dyn CommandExecutor, class_dir: &Path) -> bool {
    let has_device = std::fs::read_dir(class_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if has_device {
        return true;
    }
    run_ok(exec, &DMESG, FIRMWARE_PROBE_TIMEOUT)
        .is_some_and(|out| out.to_ascii_lowercase().contains("tpm"))
}

fn detect_secure_boot(exec: &mut dyn CommandExecutor) -> SecureBoot {
    if !exec.is_available(MOKUTIL.program()) {
        return SecureBoot::Unknown;
    }
    run_ok(exec, &MOKUTIL, FIRMWARE_PROBE_TIMEOUT)
        .map(|out| parse_secure_boot(&out))
        .unwrap_or_default()
}

/// Collect from the live host using `config`.
///
/// With `config.debug` set, every probe is recorded under
/// `config.artifacts_dir`. If that directory cannot be created, collection
/// proceeds without artifacts.
pub fn collect_host(config: &CollectConfig) -> Document {
    let options = CollectOptions::from_config(config);
    let mut runner = ProbeRunner::new(config.tool_config());

    if config.debug {
        let host = local_hostname().unwrap_or_default();
        match ArtifactWriter::create(&config.artifacts_dir, generate_run_id(), host) {
            Ok(writer) => runner = runner.with_artifacts(writer),
            Err(e) => warn!(
                dir = %config.artifacts_dir.display(),
                error = %e,
                "debug artifacts disabled"
            ),
        }
    }

    let doc = collect(&options, &mut runner);

    if let Some(manifest) = runner.finish() {
        info!(
            run_id = %manifest.run_id,
            files = manifest.file_count(),
            bytes = manifest.total_bytes(),
            "debug artifacts written"
        );
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::runner::EXIT_NOT_FOUND;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    /// Scripted executor: canned stdout per probe, everything else missing.
    #[derive(Default)]
    struct Scripted {
        outputs: BTreeMap<&'static str, (i32, &'static str, &'static str)>,
        available: BTreeSet<&'static str>,
        calls: Vec<String>,
    }

    impl Scripted {
        fn ok(mut self, probe: &'static str, stdout: &'static str) -> Self {
            self.outputs.insert(probe, (0, stdout, ""));
            self
        }

        fn with(mut self, probe: &'static str, code: i32, stdout: &'static str, stderr: &'static str) -> Self {
            self.outputs.insert(probe, (code, stdout, stderr));
            self
        }

        fn available(mut self, programs: &[&'static str]) -> Self {
            self.available.extend(programs.iter().copied());
            self
        }
    }

    impl CommandExecutor for Scripted {
        fn execute(&mut self, name: &str, argv: &[&str], _timeout: Option<Duration>) -> ProbeResult {
            self.calls.push(name.to_string());
            match self.outputs.get(name) {
                Some((code, stdout, stderr)) => ProbeResult {
                    name: name.to_string(),
                    argv: argv.iter().map(|s| s.to_string()).collect(),
                    exit_code: *code,
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    duration_ms: 1,
                    timed_out: false,
                    truncated: false,
                },
                None => ProbeResult::not_found(name, argv, "missing"),
            }
        }

        fn is_available(&self, program: &str) -> bool {
            self.available.contains(program)
        }
    }

    fn isolated_options(root: &Path) -> CollectOptions {
        CollectOptions {
            os_release_path: root.join("os-release"),
            init_comm_path: root.join("comm"),
            tpm_class_dir: root.join("tpm"),
            hostname: Some("testhost".to_string()),
            ..CollectOptions::default()
        }
    }

    #[test]
    fn test_all_probes_fail_yields_skeleton() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default();
        let doc = collect(&isolated_options(tmp.path()), &mut exec);

        assert!(doc.debug.validation_errors.is_none());
        assert_eq!(doc.meta.host.hostname.as_deref(), Some("testhost"));
        assert!(doc.meta.generated_at.is_some());
        assert_eq!(doc.cpu, Default::default());
        assert!(doc.gpu.is_empty());
        assert!(doc.network.is_empty());
        assert_eq!(doc.firmware.tpm_present, Some(false));
        assert_eq!(doc.firmware.secure_boot, SecureBoot::Unknown);
        assert_eq!(doc.software.packages, Packages::default());
        assert!(doc.debug.artifacts_dir.is_none());
    }

    #[test]
    fn test_generated_at_is_second_precision_utc() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with("+00:00"), "{stamp}");
        assert!(!stamp.contains('.'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_lscpu_falls_back_to_cpuinfo() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .with("lscpu", 1, "", "lscpu: failed")
            .ok("cpuinfo", "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel name\t: Test CPU\nflags\t: fpu sse2\n\nprocessor\t: 1\n");
        let doc = collect(&isolated_options(tmp.path()), &mut exec);

        assert_eq!(doc.cpu.model.as_deref(), Some("Test CPU"));
        assert_eq!(doc.cpu.vendor.as_deref(), Some("GenuineIntel"));
        assert_eq!(doc.cpu.logical_processors, Some(2));
        assert_eq!(doc.cpu.cores, Some(2));
        assert_eq!(doc.cpu.flags, vec!["fpu", "sse2"]);
    }

    #[test]
    fn test_lscpu_success_skips_cpuinfo() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default().ok(
            "lscpu",
            r#"{"lscpu":[{"field":"Socket(s):","data":"2"},{"field":"Core(s) per socket:","data":"8"},{"field":"CPU(s):","data":"32"}]}"#,
        );
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.cpu.cores, Some(16));
        assert_eq!(doc.cpu.logical_processors, Some(32));
        assert!(!exec.calls.iter().any(|c| c == "cpuinfo"));
    }

    #[test]
    fn test_gpu_derived_from_pci() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default().ok(
            "lspci",
            "00:02.0 \"VGA compatible controller\" \"Intel Corporation\" \"UHD Graphics 620\"\n02:00.0 \"Ethernet controller\" \"Realtek\" \"RTL8111\"\n",
        );
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.buses.pci.len(), 2);
        assert_eq!(doc.gpu.len(), 1);
        assert_eq!(doc.gpu[0].bus.as_deref(), Some("00:02.0"));
    }

    #[test]
    fn test_ip_probe_requires_ip() {
        let tmp = tempdir().unwrap();
        let json = r#"[{"ifname":"lo","operstate":"UNKNOWN","address":"00:00:00:00:00:00","addr_info":[{"local":"127.0.0.1"}]}]"#;

        let mut without = Scripted::default().ok("ip_addr", json);
        let doc = collect(&isolated_options(tmp.path()), &mut without);
        assert!(doc.network.is_empty());
        assert!(!without.calls.iter().any(|c| c == "ip_addr"));

        let mut with = Scripted::default().ok("ip_addr", json).available(&["ip"]);
        let doc = collect(&isolated_options(tmp.path()), &mut with);
        assert_eq!(doc.network.len(), 1);
        assert_eq!(doc.network[0].addresses, vec!["127.0.0.1"]);
    }

    #[test]
    fn test_first_answering_package_manager_wins() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .with("packages_dpkg", 0, "   \n", "")
            .ok("packages_rpm", "bash-5.2\nglibc-2.39\n")
            .ok("packages_pacman", "linux 6.9\n")
            .available(&["dpkg", "rpm", "pacman"]);
        let doc = collect(&isolated_options(tmp.path()), &mut exec);

        assert_eq!(doc.software.packages.manager.as_deref(), Some("rpm"));
        assert_eq!(doc.software.packages.items, vec!["bash-5.2", "glibc-2.39"]);
        assert!(!exec.calls.iter().any(|c| c == "packages_pacman"));
    }

    #[test]
    fn test_package_limit_applies() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .ok("packages_pacman", "a 1\nb 2\nc 3\n")
            .available(&["pacman"]);
        let options = CollectOptions {
            package_limit: 2,
            ..isolated_options(tmp.path())
        };
        let doc = collect(&options, &mut exec);
        assert_eq!(doc.software.packages.items.len(), 2);
        assert!(doc.software.packages.truncated);
    }

    #[test]
    fn test_runtimes_and_python_fallback() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .with("python", 127, "", "missing")
            .ok("python_fallback", "Python 2.7.18\n")
            .with("java", 0, "", "openjdk version \"17.0.11\"\nOpenJDK Runtime\n")
            .ok("node", "v20.12.2\n")
            .available(&["python3", "python", "java", "node"]);
        let doc = collect(&isolated_options(tmp.path()), &mut exec);

        let runtimes = &doc.software.runtimes;
        assert_eq!(runtimes.get("python").map(String::as_str), Some("Python 2.7.18"));
        assert_eq!(runtimes.get("java").map(String::as_str), Some("openjdk version \"17.0.11\""));
        assert_eq!(runtimes.get("node").map(String::as_str), Some("v20.12.2"));
        assert!(!runtimes.contains_key("python_fallback"));
        assert!(!runtimes.contains_key("docker"));
    }

    #[test]
    fn test_python_fallback_skipped_when_primary_answers() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .ok("python", "Python 3.11.2\n")
            .ok("python_fallback", "Python 2.7.18\n")
            .available(&["python3", "python"]);
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.software.runtimes["python"], "Python 3.11.2");
        assert!(!exec.calls.iter().any(|c| c == "python_fallback"));
    }

    #[test]
    fn test_extras_collected_on_request() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .ok("docker_ps", "{\"ID\":\"abc\"}\n\n")
            .ok("docker_images", "{\"Repository\":\"alpine\"}\n")
            .ok("virsh", " Id   Name   State\n----\n")
            .ok("systemctl", "UNIT FILE STATE\n")
            .available(&["docker", "virsh"]);
        let options = CollectOptions {
            extras: vec!["docker".into(), "kvm".into(), "systemd".into(), "bogus".into()],
            ..isolated_options(tmp.path())
        };
        let doc = collect(&options, &mut exec);

        let extras = &doc.software.extras;
        assert_eq!(extras["docker_containers"], vec!["{\"ID\":\"abc\"}"]);
        assert_eq!(extras["docker_images"].len(), 1);
        assert_eq!(extras["kvm_guests"], vec![" Id   Name   State", "----"]);
        assert!(!extras.contains_key("systemd_unit_files"));
        assert!(!exec.calls.iter().any(|c| c == "systemctl"));
    }

    #[test]
    fn test_no_extras_by_default() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default().ok("docker_ps", "x\n").available(&["docker"]);
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert!(doc.software.extras.is_empty());
        assert!(!exec.calls.iter().any(|c| c == "docker_ps"));
    }

    #[test]
    fn test_files_feed_os_and_init() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join("os-release"),
            "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nNAME=\"Debian GNU/Linux\"\nVERSION_ID=\"12\"\nID=debian\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("comm"), "systemd\n").unwrap();
        let mut exec = Scripted::default()
            .ok("uname_r", "6.1.0-18-amd64\n")
            .ok("uname_m", "x86_64\n");
        let doc = collect(&isolated_options(tmp.path()), &mut exec);

        let os = &doc.meta.host.os;
        assert_eq!(os.name.as_deref(), Some("Debian GNU/Linux"));
        assert_eq!(os.version.as_deref(), Some("12"));
        assert_eq!(os.kernel.as_deref(), Some("6.1.0-18-amd64"));
        assert_eq!(os.architecture.as_deref(), Some("x86_64"));
        assert_eq!(doc.software.init.as_deref(), Some("systemd"));
    }

    #[test]
    fn test_tpm_detection() {
        let tmp = tempdir().unwrap();
        let tpm_dir = tmp.path().join("tpm");
        std::fs::create_dir(&tpm_dir).unwrap();

        let mut exec = Scripted::default().ok("dmesg", "[Mon] tpm_tis MSFT0101:00: 2.0 TPM\n");
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.firmware.tpm_present, Some(true));

        std::fs::create_dir(tpm_dir.join("tpm0")).unwrap();
        let mut exec = Scripted::default();
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.firmware.tpm_present, Some(true));
        assert!(!exec.calls.iter().any(|c| c == "dmesg"));
    }

    #[test]
    fn test_secure_boot_needs_mokutil() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default().ok("mokutil", "SecureBoot enabled\n");
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.firmware.secure_boot, SecureBoot::Unknown);

        let mut exec = Scripted::default()
            .ok("mokutil", "SecureBoot enabled\n")
            .available(&["mokutil"]);
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.firmware.secure_boot, SecureBoot::Enabled);
    }

    #[test]
    fn test_failed_probe_keeps_section_default() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .with("meminfo", EXIT_NOT_FOUND, "MemTotal: 1 kB\n", "")
            .with("dmidecode_bios", 1, "Vendor: X\n", "permission denied");
        let doc = collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(doc.memory.total_bytes, None);
        assert_eq!(doc.firmware.bios_vendor, None);
    }

    #[test]
    fn test_probe_order_follows_catalog() {
        let tmp = tempdir().unwrap();
        let mut exec = Scripted::default()
            .ok("lscpu", "{}")
            .available(&["ip", "mokutil"]);
        collect(&isolated_options(tmp.path()), &mut exec);
        assert_eq!(
            exec.calls,
            vec![
                "uname_r",
                "uname_m",
                "lscpu",
                "cpuinfo",
                "meminfo",
                "dmidecode_memory",
                "dmidecode_baseboard",
                "dmidecode_bios",
                "lspci",
                "lsusb",
                "lsblk",
                "ip_addr",
                "dmesg",
                "mokutil",
                "dmidecode_slots",
            ]
        );
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = probe_catalog();
        let names: BTreeSet<_> = catalog.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), catalog.len());
        assert!(catalog.iter().all(|p| !p.argv.is_empty()));
    }
}
