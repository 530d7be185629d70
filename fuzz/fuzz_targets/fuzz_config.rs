//! Fuzz target for spektor.toml parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_core::config::CollectConfig;

fuzz_target!(|data: &str| {
    if let Ok(config) = toml::from_str::<CollectConfig>(data) {
        let _ = config.validate();
    }
});
