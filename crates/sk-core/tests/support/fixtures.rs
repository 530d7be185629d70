//! Recorded probe output from a reference workstation, and an executor
//! that serves it.

#![allow(dead_code)]
// Each test binary uses a different subset of the fixtures.

use sk_core::collect::{CommandExecutor, ProbeResult};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

pub const OS_RELEASE: &str = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
NAME="Debian GNU/Linux"
VERSION_ID="12"
VERSION="12 (bookworm)"
VERSION_CODENAME=bookworm
ID=debian
HOME_URL="https://www.debian.org/"
"#;

pub const LSCPU: &str = r#"{
   "lscpu": [
      {"field": "Architecture:", "data": "x86_64"},
      {"field": "CPU(s):", "data": "16"},
      {"field": "Vendor ID:", "data": "AuthenticAMD",
       "children": [
          {"field": "Model name:", "data": "AMD Ryzen 7 5800X 8-Core Processor",
           "children": [
              {"field": "Thread(s) per core:", "data": "2"},
              {"field": "Core(s) per socket:", "data": "8"},
              {"field": "Socket(s):", "data": "1"},
              {"field": "Flags:", "data": "fpu vme de pse tsc msr sse sse2 avx2"}
           ]}
       ]}
   ]
}"#;

pub const MEMINFO: &str = "MemTotal:       16332088 kB
MemFree:         1203344 kB
MemAvailable:    9876543 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
HugePages_Total:       0
";

pub const DMI_MEMORY: &str = "# dmidecode 3.4
Handle 0x0040, DMI type 17, 92 bytes
Memory Device
\tSize: 8 GB
\tLocator: DIMM_A1
\tBank Locator: BANK 0
\tType: DDR4
\tSpeed: 3200 MT/s
\tManufacturer: Kingston
\tPart Number: KHX3200C16D4/8GX

Handle 0x0041, DMI type 17, 92 bytes
Memory Device
\tSize: No Module Installed
\tLocator: DIMM_A2
\tType: Unknown

Handle 0x0042, DMI type 17, 92 bytes
Memory Device
\tSize: 8 GB
\tLocator: DIMM_B1
\tBank Locator: BANK 1
\tType: DDR4
\tSpeed: 3200 MT/s
\tManufacturer: Kingston
\tPart Number: KHX3200C16D4/8GX
";

pub const DMI_BASEBOARD: &str = "# dmidecode 3.4
Handle 0x0002, DMI type 2, 15 bytes
Base Board Information
\tManufacturer: ASUSTeK COMPUTER INC.
\tProduct Name: ROG STRIX B550-F GAMING
\tVersion: Rev X.0x
\tSerial Number: 200164419200123
";

pub const DMI_BIOS: &str = "# dmidecode 3.4
Handle 0x0000, DMI type 0, 26 bytes
BIOS Information
\tVendor: American Megatrends Inc.
\tVersion: 2803
\tRelease Date: 04/27/2022
";

pub const LSPCI: &str = r#"00:00.0 "Host bridge" "Advanced Micro Devices, Inc. [AMD]" "Starship/Matisse Root Complex" "ASUSTeK Computer Inc." "Device 8809"
07:00.0 "VGA compatible controller" "NVIDIA Corporation" "GA104 [GeForce RTX 3070]" -ra1 "ASUSTeK Computer Inc." "Device 87c1"
07:00.1 "Audio device" "NVIDIA Corporation" "GA104 High Definition Audio Controller" -ra1 "ASUSTeK Computer Inc." "Device 87c1"
05:00.0 "Ethernet controller" "Intel Corporation" "Ethernet Controller I225-V" -r03 "ASUSTeK Computer Inc." "Device 87d2"
"#;

pub const LSUSB: &str = "Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub
Bus 001 Device 002: ID 046d:c52b Logitech, Inc. Unifying Receiver
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
";

pub const LSBLK: &str = r#"{
   "blockdevices": [
      {"name": "nvme0n1", "size": 1000204886016, "rota": false, "tran": "nvme",
       "model": "Samsung SSD 980 PRO 1TB", "serial": "S5GXNX0R123456", "mountpoints": [null],
       "children": [
          {"name": "nvme0n1p1", "size": 536870912, "rota": false, "tran": null, "model": null,
           "serial": null, "mountpoints": ["/boot/efi"]},
          {"name": "nvme0n1p2", "size": 999666966528, "rota": false, "tran": null, "model": null,
           "serial": null, "mountpoints": ["/"]}
       ]}
   ]
}"#;

pub const IP_ADDR: &str = r#"[
  {"ifindex": 1, "ifname": "lo", "operstate": "UNKNOWN", "address": "00:00:00:00:00:00",
   "addr_info": [{"family": "inet", "local": "127.0.0.1"}, {"family": "inet6", "local": "::1"}]},
  {"ifindex": 2, "ifname": "enp5s0", "operstate": "UP", "address": "04:42:1a:00:11:22",
   "addr_info": [{"family": "inet", "local": "192.168.1.50"}]}
]"#;

pub const DPKG: &str = "Desired=Unknown/Install/Remove/Purge/Hold
| Status=Not/Inst/Conf-files/Unpacked/halF-conf/Half-inst/trig-aWait/Trig-pend
|/ Err?=(none)/Reinst-required (Status,Err: uppercase=bad)
||/ Name           Version        Architecture Description
+++-==============-==============-============-=================================
ii  adduser        3.134          all          add and remove users and groups
ii  bash           5.2.15-2+b7    amd64        GNU Bourne Again SHell
";

pub const DMI_SLOTS: &str = "# dmidecode 3.4
Handle 0x0010, DMI type 9, 17 bytes
System Slot Information
\tDesignation: PCIEX16_1
\tType: x16 PCI Express 4 x16
\tCurrent Usage: In Use
\tLength: Long
\tBus Address: 0000:07:00.0
\tData Bus Width: x16

Handle 0x0011, DMI type 9, 17 bytes
System Slot Information
\tDesignation: PCIEX1_1
\tType: x1 PCI Express 3 x1
\tCurrent Usage: Available
\tLength: Short
\tBus Address: 0000:ff:1f.7
";

/// Serves canned probe output; probes without a fixture behave as missing.
#[derive(Default)]
pub struct FixtureExecutor {
    outputs: BTreeMap<String, (i32, String, String)>,
    available: BTreeSet<String>,
    pub calls: Vec<String>,
}

impl FixtureExecutor {
    /// Every probe of the reference workstation.
    pub fn workstation() -> Self {
        Self::default()
            .ok("uname_r", "6.1.0-18-amd64\n")
            .ok("uname_m", "x86_64\n")
            .ok("lscpu", LSCPU)
            .ok("meminfo", MEMINFO)
            .ok("dmidecode_memory", DMI_MEMORY)
            .ok("dmidecode_baseboard", DMI_BASEBOARD)
            .ok("dmidecode_bios", DMI_BIOS)
            .ok("lspci", LSPCI)
            .ok("lsusb", LSUSB)
            .ok("lsblk", LSBLK)
            .ok("ip_addr", IP_ADDR)
            .ok("packages_dpkg", DPKG)
            .ok("python", "Python 3.11.2\n")
            .ok("node", "v18.19.0\n")
            .ok("mokutil", "SecureBoot disabled\n")
            .ok("dmidecode_slots", DMI_SLOTS)
            .available(&["ip", "dpkg", "python3", "node", "mokutil"])
    }

    pub fn ok(self, probe: &str, stdout: &str) -> Self {
        self.with(probe, 0, stdout, "")
    }

    pub fn with(mut self, probe: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.outputs
            .insert(probe.to_string(), (code, stdout.to_string(), stderr.to_string()));
        self
    }

    pub fn available(mut self, programs: &[&str]) -> Self {
        self.available.extend(programs.iter().map(|p| p.to_string()));
        self
    }
}

impl CommandExecutor for FixtureExecutor {
    fn execute(&mut self, name: &str, argv: &[&str], _timeout: Option<Duration>) -> ProbeResult {
        self.calls.push(name.to_string());
        match self.outputs.get(name) {
            Some((code, stdout, stderr)) => ProbeResult {
                name: name.to_string(),
                argv: argv.iter().map(|s| s.to_string()).collect(),
                exit_code: *code,
                stdout: stdout.clone(),
                stderr: stderr.clone(),
                duration_ms: 3,
                timed_out: false,
                truncated: false,
            },
            None => ProbeResult::not_found(name, argv, format!("{}: not found", argv[0])),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.available.contains(program)
    }
}

/// Write the workstation's os-release and init files under `root`.
pub fn write_host_files(root: &Path) {
    std::fs::write(root.join("os-release"), OS_RELEASE).expect("write os-release");
    std::fs::write(root.join("comm"), "systemd\n").expect("write comm");
    std::fs::create_dir_all(root.join("tpm").join("tpm0")).expect("create tpm dir");
}
