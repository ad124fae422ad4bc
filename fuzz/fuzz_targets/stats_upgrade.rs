//! Fuzz target for the legacy statistics upgrade.
//!
//! Any well-formed document is converted to a record and upgraded twice;
//! the second pass must not change anything.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pbdataset::reader::stats::fuzz_upgrade_stats_xml;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(changed_twice) = fuzz_upgrade_stats_xml(xml) {
        assert!(!changed_twice);
    }
});
