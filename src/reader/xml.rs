//! Dataset XML reader.
//!
//! A dataset element may hold four structural children, matched by local
//! name regardless of namespace:
//! - `ExternalResources`: the data files
//! - `DataSets`: nested datasets, parsed recursively
//! - `Filters`: filter predicates
//! - `DataSetMetadata`: free-form metadata (and summary statistics)
//!
//! Any other child is ignored so newer schema extensions still load.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};

use super::location::absolute_path;
use super::resources::companion_indices;
use super::tags::{attribute_key, to_record, DataSetTag};
use crate::error::DataSetError;
use crate::model::{
    resources_from_record, DataSet, DataSetKind, DataSetMetadata, ExternalResource, Filters,
};

/// Builds a dataset node of `kind` from a dataset element.
pub fn parse_element(kind: DataSetKind, element: Node<'_, '_>) -> DataSet {
    let mut result = DataSet::new(kind);
    result.obj_metadata = element
        .attributes()
        .map(|attribute| (attribute_key(&attribute), attribute.value().to_string()))
        .collect();

    for child in element.children().filter(|node| node.is_element()) {
        match DataSetTag::of(child) {
            DataSetTag::ExternalResources => {
                result.external_resources = resources_from_record(&to_record(child));
            }
            DataSetTag::DataSets => {
                result.subdatasets = child
                    .children()
                    .filter(|node| node.is_element())
                    .map(|nested| parse_element(kind, nested))
                    .collect();
            }
            DataSetTag::Filters => result.filters = Filters::from_record(to_record(child)),
            DataSetTag::DataSetMetadata => {
                result.metadata = DataSetMetadata::from_record(to_record(child));
            }
            DataSetTag::Other => {}
        }
    }

    result
}

/// Reads a dataset XML file.
///
/// Resource paths are made absolute relative to the file's own directory,
/// and resources found on disk get any undeclared index files attached.
pub fn parse_file(kind: DataSetKind, path: &Path) -> Result<DataSet, DataSetError> {
    let xml = read_xml_file(path)?;
    let mut dataset = parse_dataset_xml_str(kind, &xml, path)?;

    let base = absolute_path(path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    dataset.make_paths_absolute(&base);
    attach_companion_indices(&mut dataset);

    Ok(dataset)
}

/// Parse dataset XML from a string. Paths are left as written.
pub fn from_dataset_xml_str(kind: DataSetKind, xml: &str) -> Result<DataSet, DataSetError> {
    parse_dataset_xml_str(kind, xml, Path::new("<string>"))
}

/// Parse dataset XML from bytes (must be valid UTF-8).
pub fn from_dataset_xml_slice(kind: DataSetKind, bytes: &[u8]) -> Result<DataSet, DataSetError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| DataSetError::XmlParse {
        path: PathBuf::from("<bytes>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_dataset_xml_str(kind, xml, Path::new("<bytes>"))
}

/// Local name of the root element of an XML file (e.g. `SubreadSet`).
pub fn xml_root_type(path: &Path) -> Result<String, DataSetError> {
    let xml = read_xml_file(path)?;
    let document = parse_document(&xml, path)?;
    Ok(document.root_element().tag_name().name().to_string())
}

/// Reads a file that is expected to hold XML.
///
/// Content that is not UTF-8 is reported as malformed XML, so binary files
/// probed as XML fail the same way a bad document does.
pub(crate) fn read_xml_file(path: &Path) -> Result<String, DataSetError> {
    let bytes = fs::read(path).map_err(DataSetError::Io)?;
    String::from_utf8(bytes).map_err(|source| DataSetError::XmlParse {
        path: path.to_path_buf(),
        message: format!("input is not valid UTF-8: {source}"),
    })
}

pub(crate) fn parse_document<'input>(
    xml: &'input str,
    path: &Path,
) -> Result<Document<'input>, DataSetError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    Document::parse_with_options(xml, options).map_err(|source| DataSetError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })
}

fn parse_dataset_xml_str(kind: DataSetKind, xml: &str, path: &Path) -> Result<DataSet, DataSetError> {
    let document = parse_document(xml, path)?;
    Ok(parse_element(kind, document.root_element()))
}

fn attach_companion_indices(dataset: &mut DataSet) {
    dataset.for_each_resource_mut(&mut |resource: &mut ExternalResource| {
        if Path::new(&resource.resource_id).is_file() {
            let found = companion_indices(&resource.resource_id);
            resource.add_indices(found);
        }
    });
}
