//! External resources: primary data files plus their attached companions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::kind::{
    index_meta_type, DataSetKind, CONTROL_META_TYPE, SCRAPS_META_TYPE, STS_META_TYPE,
};
use super::record::GenericRecord;

/// Named slot for a companion binary attached to a subreads BAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubResourceSlot {
    Scraps,
    Control,
}

impl SubResourceSlot {
    pub const ALL: [SubResourceSlot; 2] = [SubResourceSlot::Scraps, SubResourceSlot::Control];

    /// Filename suffix that identifies this companion.
    pub fn suffix(&self) -> &'static str {
        match self {
            SubResourceSlot::Scraps => ".scraps.bam",
            SubResourceSlot::Control => ".control.subreads.bam",
        }
    }

    /// Slot name: the first dot-separated segment of the suffix.
    pub fn name(&self) -> &'static str {
        match self {
            SubResourceSlot::Scraps => "scraps",
            SubResourceSlot::Control => "control",
        }
    }

    /// Meta type recorded for resources held in this slot.
    pub fn meta_type(&self) -> &'static str {
        match self {
            SubResourceSlot::Scraps => SCRAPS_META_TYPE,
            SubResourceSlot::Control => CONTROL_META_TYPE,
        }
    }

    fn from_meta_type(meta_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.meta_type() == meta_type)
    }
}

/// A companion index file (`.pbi`, `.bai`, `.fai`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndex {
    pub resource_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_type: Option<String>,
}

impl FileIndex {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            meta_type: None,
        }
    }

    fn from_record(record: &GenericRecord) -> Self {
        Self {
            resource_id: record.attribute("ResourceId").unwrap_or_default().to_string(),
            meta_type: record.attribute("MetaType").map(ToOwned::to_owned),
        }
    }
}

/// A reference to a primary data file and its attachments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResource {
    /// Absolute path, or the original reference when it could not be resolved.
    pub resource_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_type: Option<String>,

    /// Remaining XML attributes (`UniqueId`, `Name`, `TimeStampedName`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<FileIndex>,

    /// Path to the chip statistics file for this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraps: Option<Box<ExternalResource>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<Box<ExternalResource>>,

    /// Nested resources that fit none of the named slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub others: Vec<ExternalResource>,

    /// Child elements with no typed counterpart, kept as-is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<GenericRecord>,
}

impl ExternalResource {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            ..Default::default()
        }
    }

    /// Rebuilds a typed resource from an `ExternalResource` record.
    pub fn from_record(record: &GenericRecord) -> Self {
        let mut attributes = record.attrib.clone();
        let mut resource = ExternalResource::new(attributes.remove("ResourceId").unwrap_or_default());
        resource.meta_type = attributes.remove("MetaType");
        resource.attributes = attributes;

        for child in &record.children {
            match child.tag.as_str() {
                "FileIndices" => resource.indices.extend(
                    child
                        .children_named("FileIndex")
                        .map(FileIndex::from_record),
                ),
                "ExternalResources" => {
                    for nested in resources_from_record(child) {
                        resource.attach_nested(nested);
                    }
                }
                _ => resource.extra.push(child.clone()),
            }
        }

        resource
    }

    fn attach_nested(&mut self, nested: ExternalResource) {
        match nested.meta_type.as_deref() {
            Some(STS_META_TYPE) => self.sts = Some(nested.resource_id),
            Some(meta_type) => match SubResourceSlot::from_meta_type(meta_type) {
                Some(slot) => self.set_sub_resource(slot, nested),
                None => self.others.push(nested),
            },
            None => self.others.push(nested),
        }
    }

    /// Adds index files not already attached, keeping their order.
    pub fn add_indices<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            if !self.indices.iter().any(|index| index.resource_id == path) {
                self.indices.push(FileIndex::new(path));
            }
        }
    }

    /// Paths of all attached index files.
    pub fn index_paths(&self) -> impl Iterator<Item = &str> {
        self.indices.iter().map(|index| index.resource_id.as_str())
    }

    pub fn sub_resource(&self, slot: SubResourceSlot) -> Option<&ExternalResource> {
        match slot {
            SubResourceSlot::Scraps => self.scraps.as_deref(),
            SubResourceSlot::Control => self.control.as_deref(),
        }
    }

    pub fn set_sub_resource(&mut self, slot: SubResourceSlot, resource: ExternalResource) {
        let boxed = Some(Box::new(resource));
        match slot {
            SubResourceSlot::Scraps => self.scraps = boxed,
            SubResourceSlot::Control => self.control = boxed,
        }
    }

    /// Applies `rewrite` to every file path reachable from this resource:
    /// its own id, indices, sts file, sub-resources and nested resources.
    pub fn for_each_path_mut<F>(&mut self, rewrite: &mut F)
    where
        F: FnMut(&mut String),
    {
        rewrite(&mut self.resource_id);
        for index in &mut self.indices {
            rewrite(&mut index.resource_id);
        }
        if let Some(sts) = self.sts.as_mut() {
            rewrite(sts);
        }
        for nested in [self.scraps.as_deref_mut(), self.control.as_deref_mut()]
            .into_iter()
            .flatten()
        {
            nested.for_each_path_mut(rewrite);
        }
        for nested in &mut self.others {
            nested.for_each_path_mut(rewrite);
        }
    }

    /// Fills in missing meta types for this resource and its attachments.
    pub fn populate_meta_types(&mut self, kind: DataSetKind) {
        if self.meta_type.is_none() {
            self.meta_type = kind
                .resource_meta_type(&self.resource_id)
                .map(ToOwned::to_owned);
        }
        for index in &mut self.indices {
            if index.meta_type.is_none() {
                index.meta_type = index_meta_type(&index.resource_id).map(ToOwned::to_owned);
            }
        }
        for slot in SubResourceSlot::ALL {
            let sub = match slot {
                SubResourceSlot::Scraps => self.scraps.as_deref_mut(),
                SubResourceSlot::Control => self.control.as_deref_mut(),
            };
            if let Some(sub) = sub {
                if sub.meta_type.is_none() {
                    sub.meta_type = Some(slot.meta_type().to_string());
                }
                sub.populate_meta_types(kind);
            }
        }
        for nested in &mut self.others {
            nested.populate_meta_types(kind);
        }
    }
}

/// Reconstructs the typed resources listed in an `ExternalResources` record.
pub fn resources_from_record(record: &GenericRecord) -> Vec<ExternalResource> {
    record
        .children_named("ExternalResource")
        .map(ExternalResource::from_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_record() -> GenericRecord {
        GenericRecord::new("ExternalResource")
            .with_attr("ResourceId", "m1.subreads.bam")
            .with_attr("MetaType", "PacBio.SubreadFile.SubreadBamFile")
            .with_attr("UniqueId", "abc")
            .with_child(
                GenericRecord::new("FileIndices").with_child(
                    GenericRecord::new("FileIndex")
                        .with_attr("ResourceId", "m1.subreads.bam.pbi")
                        .with_attr("MetaType", "PacBio.Index.PacBioIndex"),
                ),
            )
            .with_child(
                GenericRecord::new("ExternalResources")
                    .with_child(
                        GenericRecord::new("ExternalResource")
                            .with_attr("ResourceId", "m1.scraps.bam")
                            .with_attr("MetaType", SCRAPS_META_TYPE),
                    )
                    .with_child(
                        GenericRecord::new("ExternalResource")
                            .with_attr("ResourceId", "m1.sts.xml")
                            .with_attr("MetaType", STS_META_TYPE),
                    )
                    .with_child(
                        GenericRecord::new("ExternalResource")
                            .with_attr("ResourceId", "m1.adapters.fasta")
                            .with_attr("MetaType", "PacBio.SubreadFile.AdapterFastaFile"),
                    ),
            )
    }

    #[test]
    fn from_record_routes_nested_resources_into_slots() {
        let resource = ExternalResource::from_record(&resource_record());

        assert_eq!(resource.resource_id, "m1.subreads.bam");
        assert_eq!(resource.attributes.get("UniqueId"), Some(&"abc".to_string()));
        assert!(!resource.attributes.contains_key("ResourceId"));
        assert_eq!(resource.index_paths().collect::<Vec<_>>(), vec!["m1.subreads.bam.pbi"]);
        assert_eq!(
            resource
                .sub_resource(SubResourceSlot::Scraps)
                .map(|r| r.resource_id.as_str()),
            Some("m1.scraps.bam")
        );
        assert_eq!(resource.sts.as_deref(), Some("m1.sts.xml"));
        assert_eq!(resource.others.len(), 1);
        assert!(resource.control.is_none());
    }

    #[test]
    fn add_indices_skips_duplicates() {
        let mut resource = ExternalResource::new("a.bam");
        resource.add_indices(["a.bam.pbi", "a.bam.bai"]);
        resource.add_indices(["a.bam.pbi".to_string()]);
        assert_eq!(resource.indices.len(), 2);
    }

    #[test]
    fn for_each_path_mut_reaches_every_path() {
        let mut resource = ExternalResource::from_record(&resource_record());
        let mut seen = Vec::new();
        resource.for_each_path_mut(&mut |path: &mut String| {
            seen.push(path.clone());
            path.insert_str(0, "/data/");
        });

        assert_eq!(seen.len(), 5);
        assert_eq!(resource.resource_id, "/data/m1.subreads.bam");
        assert_eq!(resource.sts.as_deref(), Some("/data/m1.sts.xml"));
        assert_eq!(
            resource.scraps.as_ref().map(|r| r.resource_id.as_str()),
            Some("/data/m1.scraps.bam")
        );
    }

    #[test]
    fn populate_meta_types_fills_only_missing_values() {
        let mut resource = ExternalResource::new("/d/m1.subreads.bam");
        resource.add_indices(["/d/m1.subreads.bam.pbi"]);
        resource.set_sub_resource(SubResourceSlot::Scraps, ExternalResource::new("/d/m1.scraps.bam"));
        resource.populate_meta_types(DataSetKind::SubreadSet);

        assert_eq!(resource.meta_type.as_deref(), Some("PacBio.SubreadFile.SubreadBamFile"));
        assert_eq!(
            resource.indices[0].meta_type.as_deref(),
            Some("PacBio.Index.PacBioIndex")
        );
        assert_eq!(
            resource.scraps.as_ref().and_then(|r| r.meta_type.as_deref()),
            Some(SCRAPS_META_TYPE)
        );

        let mut tagged = ExternalResource::new("/d/other.bam");
        tagged.meta_type = Some("Custom.Type".to_string());
        tagged.populate_meta_types(DataSetKind::SubreadSet);
        assert_eq!(tagged.meta_type.as_deref(), Some("Custom.Type"));
    }
}
