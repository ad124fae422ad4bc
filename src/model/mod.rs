//! In-memory dataset model.
//!
//! A [`DataSet`] is a tree: each node owns its external resources, filters,
//! metadata and nested sub-datasets of the same [`DataSetKind`]. The reader
//! builds these trees from XML, BAM files and manifests and merges them into
//! a caller-owned dataset.
//!
//! # Example
//!
//! ```
//! use pbdataset::model::{DataSet, DataSetKind, ExternalResource};
//!
//! let mut dataset = DataSet::new(DataSetKind::SubreadSet);
//! dataset.add_external_resources([ExternalResource::new("/data/m1.subreads.bam")], false);
//! dataset.populate_meta_types();
//!
//! assert_eq!(
//!     dataset.external_resources[0].meta_type.as_deref(),
//!     Some("PacBio.SubreadFile.SubreadBamFile")
//! );
//! ```

mod dataset;
mod filters;
mod kind;
mod metadata;
mod record;
mod resource;

pub use dataset::{DataSet, MergeOutcome};
pub use filters::{Filter, FilterProperty, Filters};
pub use kind::{index_meta_type, DataSetKind, CONTROL_META_TYPE, SCRAPS_META_TYPE, STS_META_TYPE};
pub use metadata::{DataSetMetadata, StatsMetadata, SUMMARY_STATS_TAG};
pub use record::GenericRecord;
pub use resource::{resources_from_record, ExternalResource, FileIndex, SubResourceSlot};
