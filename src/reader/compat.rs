//! Upgrade of pre-3.0.16 statistics XML.
//!
//! Older `.sts.xml` files stored `BinCount` and `BinLabel` elements as
//! direct children of a distribution. Current files wrap them in
//! `BinCounts` / `BinLabels`. [`upgrade_stats`] rewrites the old shape into
//! the new one so the rest of the crate only ever sees one layout. Drop the
//! call in `stats::parse_stats` once legacy files are no longer supported.

use tracing::info;

use crate::model::GenericRecord;

pub const PIPE_STATS_NAMESPACE: &str = "http://pacificbiosciences.com/PipelineStats/PipeStats.xsd";

/// Distributions whose bins may be stored unwrapped.
pub const BIN_COUNT_DISTRIBUTIONS: [&str; 9] = [
    "MedianInsertDist",
    "ProdDist",
    "ReadTypeDist",
    "ReadLenDist",
    "ReadQualDist",
    "InsertReadQualDist",
    "InsertReadLenDist",
    "ControlReadQualDist",
    "ControlReadLenDist",
];

/// Distributions whose labels may be stored unwrapped.
pub const BIN_LABEL_DISTRIBUTIONS: [&str; 2] = ["ProdDist", "ReadTypeDist"];

/// Wraps direct `BinCount` / `BinLabel` children of known distributions.
///
/// Only elements in the PipeStats namespace below the root are touched.
/// Returns true when anything was moved; a second call is a no-op.
pub fn upgrade_stats(root: &mut GenericRecord) -> bool {
    let mut changed = false;
    for child in &mut root.children {
        changed |= upgrade_subtree(child);
    }
    changed
}

fn upgrade_subtree(record: &mut GenericRecord) -> bool {
    let mut changed = false;

    if record.namespace == PIPE_STATS_NAMESPACE {
        if BIN_COUNT_DISTRIBUTIONS.contains(&record.tag.as_str()) {
            changed |= wrap_direct_children(record, "BinCount", "BinCounts");
        }
        if BIN_LABEL_DISTRIBUTIONS.contains(&record.tag.as_str()) {
            changed |= wrap_direct_children(record, "BinLabel", "BinLabels");
        }
    }

    for child in &mut record.children {
        changed |= upgrade_subtree(child);
    }
    changed
}

fn wrap_direct_children(parent: &mut GenericRecord, item: &str, wrapper: &str) -> bool {
    let is_item = |child: &GenericRecord| child.tag == item && child.namespace == PIPE_STATS_NAMESPACE;
    if !parent.children.iter().any(is_item) {
        return false;
    }

    info!("Outdated stats XML received");
    let (items, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut parent.children)
        .into_iter()
        .partition(|child| is_item(child));
    parent.children = rest;
    parent.children.push(GenericRecord {
        children: items,
        ..GenericRecord::new(wrapper).with_namespace(PIPE_STATS_NAMESPACE)
    });
    true
}
