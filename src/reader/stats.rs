//! Summary statistics and standalone metadata readers.

use roxmltree::Node;
use tracing::info;

use super::compat::upgrade_stats;
use super::tags::to_record;
use super::uri::reference_location;
use super::xml::{parse_document, read_xml_file};
use crate::error::DataSetError;
use crate::model::{DataSet, GenericRecord, StatsMetadata};

/// Namespace of dataset XML elements.
pub const DATASETS_NAMESPACE: &str = "http://pacificbiosciences.com/PacBioDatasets.xsd";

/// Parses an `.sts.xml` file into summary statistics.
///
/// `file_ref` may be a plain path or a URI. Legacy bin layouts are upgraded
/// and the root is renamed to `SummaryStats`.
pub fn parse_stats(file_ref: &str) -> Result<StatsMetadata, DataSetError> {
    let path = reference_location(file_ref)?;
    let xml = read_xml_file(&path)?;
    let document = parse_document(&xml, &path)?;

    let mut record = to_record(document.root_element());
    upgrade_stats(&mut record);
    Ok(StatsMetadata::from_record(record))
}

/// Extracts the `DataSetMetadata` element of a dataset XML file.
///
/// The root element itself is not considered.
pub fn parse_metadata(file_ref: &str) -> Result<GenericRecord, DataSetError> {
    let path = reference_location(file_ref)?;
    let xml = read_xml_file(&path)?;
    let document = parse_document(&xml, &path)?;

    document
        .root_element()
        .descendants()
        .skip(1)
        .find(is_dataset_metadata)
        .map(to_record)
        .ok_or_else(|| DataSetError::MetadataNotFound {
            path: file_ref.to_string(),
        })
}

fn is_dataset_metadata(node: &Node<'_, '_>) -> bool {
    node.is_element()
        && node.tag_name().name() == "DataSetMetadata"
        && node.tag_name().namespace() == Some(DATASETS_NAMESPACE)
}

/// Fuzz-only entrypoint for the legacy statistics upgrade.
///
/// Returns true when a second upgrade pass changed the record.
#[cfg(feature = "fuzzing")]
pub fn fuzz_upgrade_stats_xml(xml: &str) -> Result<bool, DataSetError> {
    let document = parse_document(xml, std::path::Path::new("<fuzz>"))?;
    let mut record = to_record(document.root_element());
    upgrade_stats(&mut record);
    let once = record.clone();
    Ok(upgrade_stats(&mut record) || record != once)
}

/// Loads statistics for resources that declare an `sts` file, unless the
/// dataset already carries summary statistics.
///
/// Files that cannot be opened are logged and skipped. With `recurse` every
/// sub-dataset is processed the same way.
pub fn ensure_stats(dataset: &mut DataSet, recurse: bool) -> Result<(), DataSetError> {
    if dataset.metadata.summary_stats.is_none() {
        let sts_files: Vec<String> = dataset
            .external_resources
            .iter()
            .filter_map(|resource| resource.sts.clone())
            .collect();

        for sts in sts_files {
            match dataset.load_stats(&sts) {
                Ok(()) => {}
                Err(DataSetError::Io(source)) => {
                    info!("Sts.xml file {sts} unopenable: {source}");
                }
                Err(other) => return Err(other),
            }
        }
    }

    if recurse {
        for subdataset in &mut dataset.subdatasets {
            ensure_stats(subdataset, true)?;
        }
    }
    Ok(())
}
