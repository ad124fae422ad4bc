//! Fuzz target for dataset XML parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the dataset XML parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pbdataset::model::DataSetKind;
use pbdataset::reader::xml::from_dataset_xml_slice;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_dataset_xml_slice(DataSetKind::SubreadSet, data);
});
