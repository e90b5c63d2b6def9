//! Predicates: a mapping from field name to [`Constraint`], evaluated as an
//! implicit AND of its entries.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::constraint::Constraint;

/// Parsed query condition.
///
/// Field names are unique; inserting a field that is already present replaces
/// its constraint rather than merging the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    fields: BTreeMap<String, Constraint>,
}

impl Predicate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `constraint` under `field`, returning the constraint it replaced.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        constraint: Constraint,
    ) -> Option<Constraint> {
        self.fields.insert(field.into(), constraint)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Constraint> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fold `other` into `self`; entries of `other` win on conflict.
    pub fn merge(&mut self, other: Self) {
        self.fields.extend(other.fields);
    }

    /// Render as a filter document for a document query engine.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        let mut doc = Map::with_capacity(self.fields.len());
        for (field, constraint) in &self.fields {
            doc.insert(field.clone(), constraint.to_document());
        }
        JsonValue::Object(doc)
    }

    /// Whether `doc` satisfies every entry. Non-object documents never match
    /// a non-empty predicate.
    #[must_use]
    pub fn matches(&self, doc: &JsonValue) -> bool {
        let object = doc.as_object();
        self.fields.iter().all(|(field, constraint)| {
            constraint.matches(object.and_then(|o| o.get(field)))
        })
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<K: Into<String>> FromIterator<(K, Constraint)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, Constraint)>>(iter: I) -> Self {
        let mut predicate = Self::new();
        for (field, constraint) in iter {
            predicate.insert(field, constraint);
        }
        predicate
    }
}

impl IntoIterator for Predicate {
    type Item = (String, Constraint);
    type IntoIter = btree_map::IntoIter<String, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Predicate {
    type Item = (&'a String, &'a Constraint);
    type IntoIter = btree_map::Iter<'a, String, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
