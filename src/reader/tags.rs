//! Namespaced tag handling and generic record conversion.

use roxmltree::{Attribute, Node};

use crate::model::GenericRecord;

/// Splits a Clark-notation tag (`{namespace}Local`) into its parts.
///
/// Unqualified tags yield an empty namespace.
pub fn split_tag(tag: &str) -> (&str, &str) {
    match tag
        .strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
    {
        Some((namespace, local)) => (namespace, local),
        None => ("", tag),
    }
}

/// Builds a Clark-notation tag from a namespace and a local name.
pub fn namespace_tag(namespace: &str, local: &str) -> String {
    if namespace.is_empty() {
        local.to_string()
    } else {
        format!("{{{namespace}}}{local}")
    }
}

/// The structural children of a dataset element the parser acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSetTag {
    ExternalResources,
    DataSets,
    Filters,
    DataSetMetadata,
    Other,
}

impl DataSetTag {
    /// Resolves a local tag name by suffix, ignoring any namespace.
    pub fn from_local_name(name: &str) -> Self {
        if name.ends_with("ExternalResources") {
            DataSetTag::ExternalResources
        } else if name.ends_with("DataSets") {
            DataSetTag::DataSets
        } else if name.ends_with("Filters") {
            DataSetTag::Filters
        } else if name.ends_with("DataSetMetadata") {
            DataSetTag::DataSetMetadata
        } else {
            DataSetTag::Other
        }
    }

    pub fn of(node: Node<'_, '_>) -> Self {
        Self::from_local_name(node.tag_name().name())
    }
}

/// Key for an attribute: Clark notation when it is namespaced.
pub fn attribute_key(attribute: &Attribute<'_, '_>) -> String {
    match attribute.namespace() {
        Some(namespace) => namespace_tag(namespace, attribute.name()),
        None => attribute.name().to_string(),
    }
}

/// Converts an element subtree into a [`GenericRecord`].
///
/// Text is trimmed, attributes are copied verbatim and child elements are
/// converted recursively in document order. No tag gets special treatment.
pub fn to_record(node: Node<'_, '_>) -> GenericRecord {
    GenericRecord {
        tag: node.tag_name().name().to_string(),
        text: node.text().map(str::trim).unwrap_or_default().to_string(),
        attrib: node
            .attributes()
            .map(|attribute| (attribute_key(&attribute), attribute.value().to_string()))
            .collect(),
        children: node
            .children()
            .filter(Node::is_element)
            .map(to_record)
            .collect(),
        namespace: node.tag_name().namespace().unwrap_or_default().to_string(),
    }
}
