#![allow(dead_code)]

use std::collections::BTreeMap;

use pbdataset::model::GenericRecord;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const PIPE_STATS_NS: &str = "http://pacificbiosciences.com/PipelineStats/PipeStats.xsd";

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_tag() -> BoxedStrategy<String> {
    "[A-Z][A-Za-z0-9]{0,8}".boxed()
}

pub fn arb_namespace() -> BoxedStrategy<String> {
    prop_oneof![
        Just(String::new()),
        Just("urn:example:a".to_string()),
        Just("http://pacificbiosciences.com/PacBioDatasets.xsd".to_string()),
    ]
    .boxed()
}

/// Trimmed element text, including characters that need escaping.
pub fn arb_text() -> BoxedStrategy<String> {
    "[A-Za-z0-9.&<>;]{0,10}".boxed()
}

/// Attributes, some of them namespaced (Clark notation keys).
pub fn arb_attrib() -> BoxedStrategy<BTreeMap<String, String>> {
    let key = prop_oneof![
        "a[A-Za-z0-9]{0,6}",
        "a[A-Za-z0-9]{0,6}".prop_map(|name| format!("{{urn:example:attr}}{name}")),
    ];
    prop::collection::btree_map(key, "[A-Za-z0-9 .&<>\"']{0,12}", 0..4).boxed()
}

/// Arbitrary record trees made only of elements, text and attributes.
pub fn arb_record() -> BoxedStrategy<GenericRecord> {
    let leaf = (arb_tag(), arb_namespace(), arb_text(), arb_attrib()).prop_map(
        |(tag, namespace, text, attrib)| GenericRecord {
            tag,
            text,
            attrib,
            children: Vec::new(),
            namespace,
        },
    );

    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            arb_tag(),
            arb_namespace(),
            arb_text(),
            arb_attrib(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, namespace, text, attrib, children)| GenericRecord {
                tag,
                text,
                attrib,
                children,
                namespace,
            })
    })
    .boxed()
}

/// Shape of nested datasets: entry `i` is the number of grandchildren of
/// sub-dataset `i`.
pub fn arb_nesting() -> BoxedStrategy<Vec<usize>> {
    prop::collection::vec(0usize..4, 0..6).boxed()
}

/// A PipeStats record whose distribution stores its bins unwrapped.
pub fn legacy_distribution(tag: &str, bins: &[u64]) -> GenericRecord {
    let mut dist = GenericRecord::new(tag)
        .with_namespace(PIPE_STATS_NS)
        .with_child(
            GenericRecord::new("NumBins")
                .with_namespace(PIPE_STATS_NS)
                .with_text(bins.len().to_string()),
        );
    for bin in bins {
        dist.children.push(
            GenericRecord::new("BinCount")
                .with_namespace(PIPE_STATS_NS)
                .with_text(bin.to_string()),
        );
    }
    GenericRecord::new("PipeStats")
        .with_namespace(PIPE_STATS_NS)
        .with_child(dist)
}
