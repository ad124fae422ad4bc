//! Dataset metadata and summary statistics.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::record::GenericRecord;

/// Canonical tag of a summary statistics record.
pub const SUMMARY_STATS_TAG: &str = "SummaryStats";

const NUM_RECORDS_TAG: &str = "NumRecords";
const TOTAL_LENGTH_TAG: &str = "TotalLength";

/// The `DataSetMetadata` tree of a dataset.
///
/// The raw record is kept whole apart from `SummaryStats`, which is lifted
/// into [`StatsMetadata`] so statistics can be merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<GenericRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_stats: Option<StatsMetadata>,
}

impl DataSetMetadata {
    pub fn from_record(mut record: GenericRecord) -> Self {
        let summary_stats = record
            .take_child(SUMMARY_STATS_TAG)
            .map(StatsMetadata::from_record);
        Self {
            record: Some(record),
            summary_stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_none() && self.summary_stats.is_none()
    }

    pub fn num_records(&self) -> Option<u64> {
        self.count(NUM_RECORDS_TAG)
    }

    pub fn total_length(&self) -> Option<u64> {
        self.count(TOTAL_LENGTH_TAG)
    }

    pub fn set_num_records(&mut self, value: u64) {
        self.set_count(NUM_RECORDS_TAG, value);
    }

    pub fn set_total_length(&mut self, value: u64) {
        self.set_count(TOTAL_LENGTH_TAG, value);
    }

    fn count(&self, tag: &str) -> Option<u64> {
        self.record
            .as_ref()?
            .child(tag)?
            .text()?
            .parse()
            .ok()
    }

    fn set_count(&mut self, tag: &str, value: u64) {
        let record = self
            .record
            .get_or_insert_with(|| GenericRecord::new("DataSetMetadata"));
        let namespace = record.namespace.clone();
        match record.child_mut(tag) {
            Some(child) => child.text = value.to_string(),
            None => record
                .children
                .push(GenericRecord::new(tag).with_namespace(namespace).with_text(value.to_string())),
        }
    }

    /// Adds summary statistics, merging with any already present.
    pub fn add_summary_stats(&mut self, stats: StatsMetadata) {
        match self.summary_stats.as_mut() {
            Some(existing) => existing.merge(stats),
            None => self.summary_stats = Some(stats),
        }
    }

    /// Folds another dataset's metadata into this one.
    ///
    /// With `sum_counts` false the other record replaces this one (the first
    /// merge into an empty dataset); otherwise record counts are added.
    pub fn merge(&mut self, other: DataSetMetadata, sum_counts: bool) {
        let DataSetMetadata {
            record,
            summary_stats,
        } = other;

        match (sum_counts, self.record.is_some(), record) {
            (_, _, None) => {}
            (false, _, Some(record)) | (true, false, Some(record)) => self.record = Some(record),
            (true, true, Some(record)) => {
                let other = DataSetMetadata::from_record(record);
                if let Some(extra) = other.num_records() {
                    let total = self.num_records().unwrap_or(0).saturating_add(extra);
                    self.set_num_records(total);
                }
                if let Some(extra) = other.total_length() {
                    let total = self.total_length().unwrap_or(0).saturating_add(extra);
                    self.set_total_length(total);
                }
            }
        }

        if let Some(stats) = summary_stats {
            self.add_summary_stats(stats);
        }
    }
}

/// Summary statistics parsed from an `.sts.xml` file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsMetadata {
    pub record: GenericRecord,
}

impl StatsMetadata {
    /// Wraps a statistics record, forcing its tag to `SummaryStats`.
    pub fn from_record(mut record: GenericRecord) -> Self {
        record.tag = SUMMARY_STATS_TAG.to_string();
        Self { record }
    }

    /// A distribution element (e.g. `ReadLenDist`) by local tag name.
    pub fn distribution(&self, tag: &str) -> Option<&GenericRecord> {
        self.record.child(tag)
    }

    /// Bin counts of a distribution, in order.
    pub fn bin_counts(&self, tag: &str) -> Vec<u64> {
        self.distribution(tag)
            .and_then(|dist| dist.child("BinCounts"))
            .map(|counts| {
                counts
                    .children_named("BinCount")
                    .filter_map(|bin| bin.text.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merges another set of statistics into this one.
    ///
    /// Distributions with matching bin layouts have their `BinCount` and
    /// `SampleSize` values summed; integer scalars at the top level are
    /// summed; anything else keeps the value already present. Sums saturate
    /// at `u64::MAX`. Elements only
    /// present in `other` are appended.
    pub fn merge(&mut self, other: StatsMetadata) {
        for theirs in other.record.children {
            match self.record.child_mut(&theirs.tag) {
                Some(ours) if ours.child("BinCounts").is_some() => {
                    merge_distribution(ours, &theirs);
                }
                Some(ours) => {
                    if let (Ok(left), Ok(right)) =
                        (ours.text.parse::<u64>(), theirs.text.parse::<u64>())
                    {
                        ours.text = left.saturating_add(right).to_string();
                    }
                }
                None => self.record.children.push(theirs),
            }
        }
    }
}

fn merge_distribution(ours: &mut GenericRecord, theirs: &GenericRecord) {
    let distribution = ours.tag.clone();
    let Some(their_bins) = theirs.child("BinCounts") else {
        return;
    };
    let Some(our_bins) = ours.child_mut("BinCounts") else {
        return;
    };

    let left: Vec<&mut GenericRecord> = our_bins
        .children
        .iter_mut()
        .filter(|bin| bin.tag == "BinCount")
        .collect();
    let right: Vec<&GenericRecord> = their_bins.children_named("BinCount").collect();

    if left.len() != right.len() {
        warn!(
            distribution = %distribution,
            "Bin layouts differ ({} vs {} bins); keeping existing distribution",
            left.len(),
            right.len()
        );
        return;
    }

    for (ours_bin, theirs_bin) in left.into_iter().zip(right) {
        if let (Ok(a), Ok(b)) = (ours_bin.text.parse::<u64>(), theirs_bin.text.parse::<u64>()) {
            ours_bin.text = a.saturating_add(b).to_string();
        }
    }

    if let (Some(their_size), Some(our_size)) = (
        theirs.child("SampleSize").map(|s| s.text.clone()),
        ours.child_mut("SampleSize"),
    ) {
        if let (Ok(a), Ok(b)) = (our_size.text.parse::<u64>(), their_size.parse::<u64>()) {
            our_size.text = a.saturating_add(b).to_string();
        }
    }
}
