//! Fuzz target for package listings, version lines and Secure Boot state.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::collect::parsers::{
    parse_package_list, parse_secure_boot, parse_version_line, PackageManager,
};

fuzz_target!(|input: (&str, &str, u8)| {
    let (stdout, stderr, limit) = input;
    for manager in [PackageManager::Dpkg, PackageManager::Rpm, PackageManager::Pacman] {
        let packages = parse_package_list(manager, stdout, limit as usize);
        assert!(packages.items.len() <= limit as usize);
    }
    let _ = parse_version_line(stdout, stderr);
    let _ = parse_secure_boot(stdout);
});
