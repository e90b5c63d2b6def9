//! Find options that accompany a predicate: projection, sort, limit, offset.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Sort direction of one ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Interpret an ORDER BY direction word.
    ///
    /// Words starting with `asc` or `desc` (any case) select the direction;
    /// anything else sorts ascending.
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        let lower = word.to_ascii_lowercase();
        if lower.starts_with("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    /// Interpret a numeric direction: non-negative is ascending.
    #[must_use]
    pub const fn from_number(n: i64) -> Self {
        if n >= 0 { Self::Ascending } else { Self::Descending }
    }

    /// `1` or `-1`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl SortSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.keys.push((field.into(), direction));
    }

    /// Parse a SQL ORDER BY list such as `"created_at DESC, name"`.
    ///
    /// Returns `None` when the list names no fields.
    #[must_use]
    pub fn parse(clause: &str) -> Option<Self> {
        let mut spec = Self::new();
        for item in clause.split(',') {
            let mut words = item.split_whitespace();
            let Some(field) = words.next() else {
                continue;
            };
            let direction = words.next().map_or(SortDirection::Ascending, SortDirection::from_word);
            spec.push(field, direction);
        }
        (!spec.is_empty()).then_some(spec)
    }

    #[must_use]
    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `[{"field": 1}, {"other": -1}]`; a list keeps key order explicit.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        JsonValue::Array(
            self.keys
                .iter()
                .map(|(field, dir)| {
                    let mut m = Map::with_capacity(1);
                    m.insert(field.clone(), JsonValue::from(dir.as_i32()));
                    JsonValue::Object(m)
                })
                .collect(),
        )
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Field selection, rendered as `{"field": 1, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: BTreeSet<String>,
}

impl Projection {
    /// Returns `None` for an empty selection, meaning "all fields".
    #[must_use]
    pub fn from_fields<I, S>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: BTreeSet<String> = fields.into_iter().map(Into::into).collect();
        (!fields.is_empty()).then_some(Self { fields })
    }

    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|f| (f.clone(), JsonValue::from(1)))
                .collect(),
        )
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Options passed alongside a filter to a document `find`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FindOptions {
    #[serde(rename = "fields", skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl FindOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projection.is_none()
            && self.sort.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}
