//! Lossless structural capture of XML subtrees.
//!
//! Any element this crate does not model explicitly is kept as a
//! [`GenericRecord`]: its local tag name, namespace, trimmed text, attributes
//! and ordered children. Filters, metadata and statistics payloads are all
//! built on top of it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Namespace URI that is always bound to the reserved `xml` prefix.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A nested `{tag, text, attrib, children, namespace}` record.
///
/// Namespaced attributes are keyed as `{namespace}local`, matching the
/// Clark notation used for tags elsewhere in the crate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRecord {
    /// Local tag name, without namespace.
    pub tag: String,

    /// Trimmed text content; empty when the element has no text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Attributes, verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrib: BTreeMap<String, String>,

    /// Child elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GenericRecord>,

    /// Namespace URI; empty for unqualified elements.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl GenericRecord {
    /// Creates an empty record with the given local tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Sets the namespace of this record.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the text of this record.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Adds an attribute to this record.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrib.insert(key.into(), value.into());
        self
    }

    /// Appends a child record.
    pub fn with_child(mut self, child: GenericRecord) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attrib.get(key).map(String::as_str)
    }

    /// Returns the text, or `None` when it is empty.
    pub fn text(&self) -> Option<&str> {
        Some(self.text.as_str()).filter(|text| !text.is_empty())
    }

    /// First direct child with the given local tag name.
    pub fn child(&self, tag: &str) -> Option<&GenericRecord> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Mutable access to the first direct child with the given local tag name.
    pub fn child_mut(&mut self, tag: &str) -> Option<&mut GenericRecord> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// All direct children with the given local tag name.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a GenericRecord> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Removes and returns the first direct child with the given tag.
    pub fn take_child(&mut self, tag: &str) -> Option<GenericRecord> {
        let position = self.children.iter().position(|child| child.tag == tag)?;
        Some(self.children.remove(position))
    }

    /// Depth-first search (self included) for the first record with `tag`.
    pub fn find(&self, tag: &str) -> Option<&GenericRecord> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }

    /// Total number of records in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(GenericRecord::node_count)
            .sum::<usize>()
    }

    /// Serializes the record back into an XML document string.
    ///
    /// Element namespaces are written as default-namespace declarations where
    /// they change; namespaced attributes get `ns0`, `ns1`, ... prefixes
    /// declared on the root element.
    pub fn to_xml_string(&self) -> String {
        let mut attribute_namespaces = BTreeSet::new();
        collect_attribute_namespaces(self, &mut attribute_namespaces);
        let prefixes: BTreeMap<String, String> = attribute_namespaces
            .into_iter()
            .enumerate()
            .map(|(idx, namespace)| (namespace, format!("ns{idx}")))
            .collect();

        let mut xml = String::new();
        writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
        write_element(&mut xml, self, None, &prefixes, true);
        xml.push('\n');
        xml
    }
}

fn collect_attribute_namespaces(record: &GenericRecord, out: &mut BTreeSet<String>) {
    for key in record.attrib.keys() {
        if let Some((namespace, _)) = split_clark(key) {
            if namespace != XML_NAMESPACE {
                out.insert(namespace.to_string());
            }
        }
    }
    for child in &record.children {
        collect_attribute_namespaces(child, out);
    }
}

fn split_clark(key: &str) -> Option<(&str, &str)> {
    key.strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
}

fn write_element(
    xml: &mut String,
    record: &GenericRecord,
    parent_namespace: Option<&str>,
    prefixes: &BTreeMap<String, String>,
    is_root: bool,
) {
    write!(xml, "<{}", record.tag).expect("write to string");

    if parent_namespace.unwrap_or("") != record.namespace {
        write!(xml, " xmlns=\"{}\"", xml_escape(&record.namespace)).expect("write to string");
    }
    if is_root {
        for (namespace, prefix) in prefixes {
            write!(xml, " xmlns:{prefix}=\"{}\"", xml_escape(namespace)).expect("write to string");
        }
    }

    for (key, value) in &record.attrib {
        let name = match split_clark(key) {
            Some((namespace, local)) if namespace == XML_NAMESPACE => format!("xml:{local}"),
            Some((namespace, local)) => match prefixes.get(namespace) {
                Some(prefix) => format!("{prefix}:{local}"),
                None => local.to_string(),
            },
            None => key.clone(),
        };
        write!(xml, " {name}=\"{}\"", xml_escape(value)).expect("write to string");
    }

    if record.text.is_empty() && record.children.is_empty() {
        xml.push_str("/>");
        return;
    }

    xml.push('>');
    xml.push_str(&xml_escape(&record.text));
    for child in &record.children {
        write_element(xml, child, Some(&record.namespace), prefixes, false);
    }
    write!(xml, "</{}>", record.tag).expect("write to string");
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
