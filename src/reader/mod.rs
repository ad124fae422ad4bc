//! Populating datasets from file references.
//!
//! A reference is a path or URI naming a dataset XML file, a BAM (or other
//! binary) resource, or a file-of-file-names manifest. [`populate_dataset`]
//! expands each reference and merges the result into a caller-owned
//! [`DataSet`]:
//!
//! - XML files are parsed into a dataset tree whose paths are resolved
//!   relative to the XML file, then merged (consuming the parsed tree)
//! - BAM files are wrapped as external resources with their index files and
//!   sub-resources attached
//! - manifests are expanded line by line, recursively
//! - references without a scheme are sniffed by suffix, then by content
//!
//! # Example
//!
//! ```no_run
//! use pbdataset::model::DataSetKind;
//! use pbdataset::reader::{open_dataset, PopulateOptions};
//!
//! let options = PopulateOptions {
//!     kind: DataSetKind::SubreadSet,
//!     ..Default::default()
//! };
//! let dataset = open_dataset(&["movie.subreadset.xml", "more.fofn"], &options)?;
//! println!("{dataset}");
//! # Ok::<(), pbdataset::DataSetError>(())
//! ```

pub mod compat;
pub mod fofn;
pub mod location;
pub mod resources;
pub mod stats;
pub mod tags;
pub mod uri;
pub mod xml;

use std::path::{Path, PathBuf};

use tracing::debug;

use self::fofn::open_fofn_file;
use self::location::absolute_path;
use self::resources::add_generic_file;
use self::stats::ensure_stats;
use self::uri::{classify, FileKind};
use crate::error::DataSetError;
use crate::model::{DataSet, DataSetKind};

/// Options for populating a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopulateOptions {
    /// Kind of dataset created by [`open_dataset`].
    pub kind: DataSetKind,
    /// Load `.sts.xml` statistics for resources of parsed XML datasets.
    pub load_stats: bool,
    /// Maximum nesting of manifests and dataset files.
    pub max_depth: usize,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            kind: DataSetKind::DataSet,
            load_stats: true,
            max_depth: 64,
        }
    }
}

/// Adds every reference in `file_refs` to `dataset`, in order.
///
/// Parsed XML trees take the dataset's own kind. When the list is not empty
/// meta types are assigned afterwards.
pub fn populate_dataset<S: AsRef<str>>(
    dataset: &mut DataSet,
    file_refs: &[S],
) -> Result<(), DataSetError> {
    populate_dataset_with(dataset, file_refs, &PopulateOptions::default())
}

/// [`populate_dataset`] with explicit options. `options.kind` is not used.
pub fn populate_dataset_with<S: AsRef<str>>(
    dataset: &mut DataSet,
    file_refs: &[S],
    options: &PopulateOptions,
) -> Result<(), DataSetError> {
    Populator::new(options).populate(dataset, file_refs)
}

/// Creates a dataset of `options.kind` and populates it from `file_refs`.
///
/// Counts left stale by the population are recomputed before returning.
pub fn open_dataset<S: AsRef<str>>(
    file_refs: &[S],
    options: &PopulateOptions,
) -> Result<DataSet, DataSetError> {
    let mut dataset = DataSet::new(options.kind);
    populate_dataset_with(&mut dataset, file_refs, options)?;
    if dataset.counts_stale() {
        dataset.update_counts();
    }
    Ok(dataset)
}

/// Kind named by the root element of the first XML reference.
///
/// References without an `.xml` suffix or `xml:` scheme are skipped;
/// `DataSet` is returned when none is found or the root is not a known kind.
pub fn detect_kind<S: AsRef<str>>(file_refs: &[S]) -> Result<DataSetKind, DataSetError> {
    for file_ref in file_refs {
        let reference = classify(file_ref.as_ref())?;
        let is_xml = reference.kind == FileKind::Xml
            || (reference.kind == FileKind::Unknown
                && reference.location.to_string_lossy().ends_with(".xml"));
        if is_xml {
            let root = xml::xml_root_type(&reference.location)?;
            return Ok(DataSetKind::from_root_tag(&root).unwrap_or_default());
        }
    }
    Ok(DataSetKind::default())
}

struct Populator<'a> {
    options: &'a PopulateOptions,
    /// Manifests and dataset files currently being expanded, outermost first.
    chain: Vec<PathBuf>,
}

impl<'a> Populator<'a> {
    fn new(options: &'a PopulateOptions) -> Self {
        Self {
            options,
            chain: Vec::new(),
        }
    }

    fn populate<S: AsRef<str>>(
        &mut self,
        dataset: &mut DataSet,
        file_refs: &[S],
    ) -> Result<(), DataSetError> {
        for file_ref in file_refs {
            self.add_file(dataset, file_ref.as_ref())?;
        }
        if !file_refs.is_empty() {
            dataset.populate_meta_types();
        }
        Ok(())
    }

    fn add_file(&mut self, dataset: &mut DataSet, file_ref: &str) -> Result<(), DataSetError> {
        let reference = classify(file_ref)?;
        self.ingest(dataset, reference.kind, &reference.location)
    }

    fn ingest(
        &mut self,
        dataset: &mut DataSet,
        kind: FileKind,
        path: &Path,
    ) -> Result<(), DataSetError> {
        match kind {
            FileKind::Xml => self.add_xml_file(dataset, path),
            FileKind::Bam => {
                add_generic_file(dataset, path);
                Ok(())
            }
            FileKind::Fofn => self.add_fofn_file(dataset, path),
            FileKind::Unknown => self.add_unknown_file(dataset, path),
        }
    }

    fn add_xml_file(&mut self, dataset: &mut DataSet, path: &Path) -> Result<(), DataSetError> {
        let parsed = self.parse_xml_file(dataset.kind, path)?;
        self.merge_parsed(dataset, parsed)
    }

    fn parse_xml_file(&mut self, kind: DataSetKind, path: &Path) -> Result<DataSet, DataSetError> {
        self.enter(path)?;
        let parsed = xml::parse_file(kind, path);
        self.chain.pop();
        parsed
    }

    fn merge_parsed(&self, dataset: &mut DataSet, mut parsed: DataSet) -> Result<(), DataSetError> {
        if self.options.load_stats {
            ensure_stats(&mut parsed, false)?;
        }
        // A blocked merge has already been reported.
        dataset.merge(parsed)?;
        Ok(())
    }

    fn add_fofn_file(&mut self, dataset: &mut DataSet, path: &Path) -> Result<(), DataSetError> {
        self.enter(path)?;
        let result = self.expand_fofn(dataset, path);
        self.chain.pop();
        result
    }

    fn expand_fofn(&mut self, dataset: &mut DataSet, path: &Path) -> Result<(), DataSetError> {
        let files: Vec<String> = open_fofn_file(path)?
            .iter()
            .map(|file| file.to_string_lossy().into_owned())
            .collect();
        self.populate(dataset, &files)
    }

    fn add_unknown_file(&mut self, dataset: &mut DataSet, path: &Path) -> Result<(), DataSetError> {
        let name = path.to_string_lossy();
        if name.ends_with(".xml") {
            return self.add_xml_file(dataset, path);
        }
        if name.ends_with(".bam") {
            add_generic_file(dataset, path);
            return Ok(());
        }
        if name.ends_with(".fofn") {
            return self.add_fofn_file(dataset, path);
        }

        match self.parse_xml_file(dataset.kind, path) {
            Ok(parsed) => self.merge_parsed(dataset, parsed),
            Err(err) if err.is_malformed_xml() => {
                debug!("{name} is not dataset XML, adding it as a resource: {err}");
                add_generic_file(dataset, path);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn enter(&mut self, path: &Path) -> Result<(), DataSetError> {
        let key = path.canonicalize().unwrap_or_else(|_| absolute_path(path));
        if self.chain.contains(&key) {
            return Err(DataSetError::ReferenceCycle { path: key });
        }
        if self.chain.len() >= self.options.max_depth {
            return Err(DataSetError::RecursionLimit {
                path: key,
                depth: self.options.max_depth,
            });
        }
        self.chain.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_reference_list_leaves_dataset_untouched() {
        let mut dataset = DataSet::new(DataSetKind::SubreadSet);
        populate_dataset::<&str>(&mut dataset, &[]).expect("populate");
        assert_eq!(dataset, DataSet::new(DataSetKind::SubreadSet));
    }

    #[test]
    fn bam_scheme_wraps_resource_and_assigns_meta_types() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let bam = temp.path().join("m1.subreads.bam");
        fs::write(&bam, b"BAM\x01").expect("write bam");

        let mut dataset = DataSet::new(DataSetKind::SubreadSet);
        populate_dataset(&mut dataset, &[format!("bam:{}", bam.display())]).expect("populate");

        let bam_id = bam.to_string_lossy().into_owned();
        assert_eq!(dataset.to_external_files(), vec![bam_id.as_str()]);
        assert_eq!(
            dataset.external_resources[0].meta_type.as_deref(),
            Some("PacBio.SubreadFile.SubreadBamFile")
        );
        assert_eq!(
            dataset.obj_metadata.get("MetaType").map(String::as_str),
            Some("PacBio.DataSet.SubreadSet")
        );
    }

    #[test]
    fn detect_kind_reads_first_xml_root() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let bam = temp.path().join("reads.bam");
        let xml = temp.path().join("set.xml");
        fs::write(&bam, b"").expect("write bam");
        fs::write(&xml, "<AlignmentSet/>").expect("write xml");

        let refs = [bam.to_string_lossy(), xml.to_string_lossy()];
        assert_eq!(detect_kind(&refs).expect("detect"), DataSetKind::AlignmentSet);
        assert_eq!(detect_kind(&refs[..1]).expect("detect"), DataSetKind::DataSet);
    }

    #[test]
    fn self_listing_manifest_is_a_cycle() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let manifest = temp.path().join("loop.fofn");
        fs::write(&manifest, format!("{}\n", manifest.display())).expect("write manifest");

        let mut dataset = DataSet::default();
        let err = populate_dataset(&mut dataset, &[manifest.to_string_lossy()])
            .expect_err("cycle");
        assert!(matches!(err, DataSetError::ReferenceCycle { .. }));
    }

    #[test]
    fn nesting_beyond_max_depth_fails() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let inner = temp.path().join("inner.fofn");
        let outer = temp.path().join("outer.fofn");
        fs::write(&inner, "").expect("write inner");
        fs::write(&outer, format!("{}\n", inner.display())).expect("write outer");

        let options = PopulateOptions {
            max_depth: 1,
            ..Default::default()
        };
        let mut dataset = DataSet::default();
        let err = populate_dataset_with(&mut dataset, &[outer.to_string_lossy()], &options)
            .expect_err("too deep");
        assert!(matches!(err, DataSetError::RecursionLimit { depth: 1, .. }));
    }
}
