//! Fuzz target for artifact manifest and probe record parsing.
//!
//! Replay directories may be copied in from other hosts.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sk_bundle::{ProbeRecord, RunManifest};

fuzz_target!(|data: &str| {
    if let Ok(manifest) = RunManifest::from_json(data) {
        let _ = manifest.validate();
    }
    let _ = serde_json::from_str::<ProbeRecord>(data);
});
