//! Filter predicates attached to a dataset.

use serde::{Deserialize, Serialize};

use super::record::GenericRecord;

/// One `(Name, Operator, Value)` condition inside a filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterProperty {
    pub name: String,
    pub operator: String,
    pub value: String,
}

/// A single `Filter` element. Properties within a filter are AND-ed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    pub record: GenericRecord,
}

impl Filter {
    pub fn new(record: GenericRecord) -> Self {
        Self { record }
    }

    /// The property triples of this filter, in document order.
    pub fn properties(&self) -> Vec<FilterProperty> {
        self.record
            .child("Properties")
            .into_iter()
            .flat_map(|properties| properties.children_named("Property"))
            .map(|property| FilterProperty {
                name: property.attribute("Name").unwrap_or_default().to_string(),
                operator: property.attribute("Operator").unwrap_or_default().to_string(),
                value: property.attribute("Value").unwrap_or_default().to_string(),
            })
            .collect()
    }
}

/// Ordered filters of a dataset. Separate filters are OR-ed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters {
    pub filters: Vec<Filter>,
}

impl Filters {
    /// Builds the filter list from a `Filters` record.
    pub fn from_record(record: GenericRecord) -> Self {
        Self {
            filters: record
                .children
                .into_iter()
                .filter(|child| child.tag == "Filter")
                .map(Filter::new)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Two filter lists are merge-compatible when they hold the same
    /// filters, irrespective of order.
    pub fn is_compatible(&self, other: &Filters) -> bool {
        let mut left: Vec<Vec<FilterProperty>> =
            self.filters.iter().map(Filter::properties).collect();
        let mut right: Vec<Vec<FilterProperty>> =
            other.filters.iter().map(Filter::properties).collect();
        let key = |props: &Vec<FilterProperty>| {
            props
                .iter()
                .map(|p| format!("{}{}{}", p.name, p.operator, p.value))
                .collect::<Vec<_>>()
        };
        left.sort_by_cached_key(key);
        right.sort_by_cached_key(key);
        left == right
    }
}
