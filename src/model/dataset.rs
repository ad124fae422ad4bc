//! The in-memory dataset tree.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::filters::Filters;
use super::kind::DataSetKind;
use super::metadata::DataSetMetadata;
use super::resource::{ExternalResource, SubResourceSlot};
use crate::error::DataSetError;
use crate::reader::location::{is_absolute_reference, resolve_location};
use crate::reader::stats::parse_stats;

const GENERIC_META_TYPE: &str = "PacBio.DataSet.DataSet";

/// A dataset node: resources, filters, metadata and nested datasets.
///
/// Sub-datasets always share the kind of their parent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSet {
    pub kind: DataSetKind,

    /// Attributes of the dataset element (`UniqueId`, `MetaType`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub obj_metadata: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_resources: Vec<ExternalResource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdatasets: Vec<DataSet>,

    #[serde(default, skip_serializing_if = "Filters::is_empty")]
    pub filters: Filters,

    #[serde(default, skip_serializing_if = "DataSetMetadata::is_empty")]
    pub metadata: DataSetMetadata,

    #[serde(skip)]
    counts_stale: bool,
}

/// Result of [`DataSet::merge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// The datasets carried different filters; nothing was merged.
    Blocked,
}

impl DataSet {
    pub fn new(kind: DataSetKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Merges `other` into this dataset, consuming it.
    ///
    /// The first merge into a dataset without resources adopts the other's
    /// filters and metadata. Object attributes already set (`UniqueId`,
    /// `Name`, ...) are kept; only missing ones are copied. Later merges require compatible filters and sum
    /// the metadata counts. Resources are appended (duplicates by resource id
    /// are dropped) and sub-datasets are moved over.
    pub fn merge(&mut self, other: DataSet) -> Result<MergeOutcome, DataSetError> {
        let first_in = self.external_resources.is_empty();

        if !first_in && !self.filters.is_compatible(&other.filters) {
            warn!(
                "Filter incompatibility has blocked the merging of two {} datasets",
                self.kind
            );
            return Ok(MergeOutcome::Blocked);
        }

        self.check_obj_metadata(&other.obj_metadata)?;

        let DataSet {
            obj_metadata,
            external_resources,
            mut subdatasets,
            filters,
            metadata,
            ..
        } = other;

        if first_in {
            self.filters = filters;
        }
        for (key, value) in obj_metadata {
            self.obj_metadata.entry(key).or_insert(value);
        }
        self.metadata.merge(metadata, !first_in);
        self.add_external_resources(external_resources, false);
        self.subdatasets.append(&mut subdatasets);

        Ok(MergeOutcome::Merged)
    }

    fn check_obj_metadata(&self, other: &BTreeMap<String, String>) -> Result<(), DataSetError> {
        let ours = self.obj_metadata.get("MetaType");
        let theirs = other.get("MetaType");
        match (ours, theirs) {
            (Some(ours), Some(theirs))
                if ours != theirs && ours != GENERIC_META_TYPE && theirs != GENERIC_META_TYPE =>
            {
                Err(DataSetError::IncompatibleMetaType {
                    expected: ours.clone(),
                    found: theirs.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Appends resources, skipping any whose id is already present.
    ///
    /// With `update_count` false the derived counts are only marked stale;
    /// callers adding many files refresh them once at the end.
    pub fn add_external_resources<I>(&mut self, resources: I, update_count: bool)
    where
        I: IntoIterator<Item = ExternalResource>,
    {
        for resource in resources {
            if self
                .external_resources
                .iter()
                .any(|existing| existing.resource_id == resource.resource_id)
            {
                continue;
            }
            self.external_resources.push(resource);
        }

        if update_count {
            self.update_counts();
        } else {
            self.counts_stale = true;
        }
    }

    /// True when resources were added without refreshing counts.
    pub fn counts_stale(&self) -> bool {
        self.counts_stale
    }

    /// Recomputes `NumRecords` and `TotalLength` from sub-dataset metadata.
    ///
    /// Record counts of leaf resources live in their BAM indices, which this
    /// crate does not read; leaf datasets keep the counts they were given.
    pub fn update_counts(&mut self) {
        for subdataset in &mut self.subdatasets {
            subdataset.update_counts();
        }

        if !self.subdatasets.is_empty() {
            let num_records = self
                .subdatasets
                .iter()
                .filter_map(|sub| sub.metadata.num_records())
                .reduce(u64::saturating_add);
            let total_length = self
                .subdatasets
                .iter()
                .filter_map(|sub| sub.metadata.total_length())
                .reduce(u64::saturating_add);

            if let Some(num_records) = num_records {
                self.metadata.set_num_records(num_records);
            }
            if let Some(total_length) = total_length {
                self.metadata.set_total_length(total_length);
            }
        }

        self.counts_stale = false;
    }

    /// Rewrites every relative resource path below this node so it is
    /// resolved against `cur_start`, recursing into sub-datasets.
    ///
    /// References that cannot be found on disk keep their literal value.
    pub fn make_paths_absolute(&mut self, cur_start: &Path) {
        let mut rewrite = |path: &mut String| {
            if path.is_empty() || is_absolute_reference(path) {
                return;
            }
            let resolved = resolve_location(Path::new(path.as_str()), Some(cur_start));
            *path = resolved.to_string_lossy().into_owned();
        };

        self.for_each_resource_mut(&mut |resource: &mut ExternalResource| {
            resource.for_each_path_mut(&mut rewrite)
        });
    }

    /// Visits every external resource of this node and all sub-datasets.
    pub fn for_each_resource_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut ExternalResource),
    {
        for resource in &mut self.external_resources {
            visit(resource);
        }
        for subdataset in &mut self.subdatasets {
            subdataset.for_each_resource_mut(visit);
        }
    }

    /// Assigns meta types to the dataset and to every file lacking one.
    pub fn populate_meta_types(&mut self) {
        let kind = self.kind;
        self.obj_metadata
            .entry("MetaType".to_string())
            .or_insert_with(|| kind.meta_type());

        for resource in &mut self.external_resources {
            resource.populate_meta_types(kind);
        }
        for subdataset in &mut self.subdatasets {
            subdataset.kind = kind;
            subdataset.populate_meta_types();
        }
    }

    /// Loads a statistics file and merges it into the summary statistics.
    pub fn load_stats(&mut self, file_ref: &str) -> Result<(), DataSetError> {
        let stats = parse_stats(file_ref)?;
        self.metadata.add_summary_stats(stats);
        Ok(())
    }

    /// Resource ids of this node's external resources, in order.
    pub fn to_external_files(&self) -> Vec<&str> {
        self.external_resources
            .iter()
            .map(|resource| resource.resource_id.as_str())
            .collect()
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(
            f,
            "{pad}{} ({} resource(s), {} sub-dataset(s), {} filter(s))",
            self.kind,
            self.external_resources.len(),
            self.subdatasets.len(),
            self.filters.len()
        )?;

        if let Some(name) = self.obj_metadata.get("Name") {
            writeln!(f, "{pad}  name: {name}")?;
        }
        if let Some(num_records) = self.metadata.num_records() {
            writeln!(f, "{pad}  records: {num_records}")?;
        }
        if let Some(total_length) = self.metadata.total_length() {
            writeln!(f, "{pad}  total length: {total_length}")?;
        }
        if self.metadata.summary_stats.is_some() {
            writeln!(f, "{pad}  summary stats: loaded")?;
        }

        for resource in &self.external_resources {
            write_resource(f, resource, &format!("{pad}  "))?;
        }
        for subdataset in &self.subdatasets {
            subdataset.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

fn write_resource(f: &mut fmt::Formatter<'_>, resource: &ExternalResource, pad: &str) -> fmt::Result {
    match resource.meta_type.as_deref() {
        Some(meta_type) => writeln!(f, "{pad}{} [{meta_type}]", resource.resource_id)?,
        None => writeln!(f, "{pad}{}", resource.resource_id)?,
    }
    for index in resource.index_paths() {
        writeln!(f, "{pad}  index: {index}")?;
    }
    if let Some(sts) = resource.sts.as_deref() {
        writeln!(f, "{pad}  sts: {sts}")?;
    }
    for slot in SubResourceSlot::ALL {
        if let Some(sub) = resource.sub_resource(slot) {
            writeln!(f, "{pad}  {}: {}", slot.name(), sub.resource_id)?;
        }
    }
    Ok(())
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
