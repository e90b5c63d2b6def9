//! Per-field constraints and their document rendering.

use std::cmp::Ordering;

use serde_json::{Map, Value as JsonValue, json};

use crate::pattern::LikePattern;
use crate::value::Value;

/// Comparison operators that render as `{"$op": value}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Ne,
}

impl CompareOp {
    /// Query-language operator name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Ne => "$ne",
        }
    }
}

/// A single test applied to one field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Implicit equality: the field must equal the literal.
    Eq(Value),
    Compare(CompareOp, Value),
    /// Membership in a set of literals.
    In(Vec<Value>),
    /// Inclusive range. Always `lo <= hi` when built through [`Constraint::between`].
    Between { lo: Value, hi: Value },
    Like(LikePattern),
}

impl Constraint {
    /// Inclusive range with the bounds swapped if they arrive reversed.
    #[must_use]
    pub fn between(a: Value, b: Value) -> Self {
        if a.total_cmp(&b) == Ordering::Greater {
            Self::Between { lo: b, hi: a }
        } else {
            Self::Between { lo: a, hi: b }
        }
    }

    #[must_use]
    pub const fn lt(value: Value) -> Self {
        Self::Compare(CompareOp::Lt, value)
    }

    #[must_use]
    pub const fn lte(value: Value) -> Self {
        Self::Compare(CompareOp::Lte, value)
    }

    #[must_use]
    pub const fn gt(value: Value) -> Self {
        Self::Compare(CompareOp::Gt, value)
    }

    #[must_use]
    pub const fn gte(value: Value) -> Self {
        Self::Compare(CompareOp::Gte, value)
    }

    #[must_use]
    pub const fn ne(value: Value) -> Self {
        Self::Compare(CompareOp::Ne, value)
    }

    /// Render the constraint as the value half of a filter entry.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        match self {
            Self::Eq(v) => v.to_json(),
            Self::Compare(op, v) => {
                let mut m = Map::with_capacity(1);
                m.insert(op.as_str().to_owned(), v.to_json());
                JsonValue::Object(m)
            }
            Self::In(values) => {
                json!({ "$in": values.iter().map(Value::to_json).collect::<Vec<_>>() })
            }
            Self::Between { lo, hi } => json!({ "$gte": lo.to_json(), "$lte": hi.to_json() }),
            Self::Like(p) => p.to_document(),
        }
    }

    /// Evaluate against a document field. `None` means the field is absent.
    ///
    /// Array-valued fields match when any element matches, as in a document
    /// store. Absent fields behave like `null`.
    #[must_use]
    pub fn matches(&self, field: Option<&JsonValue>) -> bool {
        match field {
            Some(JsonValue::Array(items)) => {
                if let Self::Compare(CompareOp::Ne, _) = self {
                    items.iter().all(|item| self.matches_scalar(item))
                } else {
                    items.iter().any(|item| self.matches_scalar(item))
                }
            }
            Some(item) => self.matches_scalar(item),
            None => self.matches_value(&Value::Null),
        }
    }

    fn matches_scalar(&self, item: &JsonValue) -> bool {
        Value::from_json(item).is_some_and(|v| self.matches_value(&v))
    }

    fn matches_value(&self, v: &Value) -> bool {
        match self {
            Self::Eq(want) => v.loose_eq(want),
            Self::Compare(op, bound) => match op {
                CompareOp::Ne => !v.loose_eq(bound),
                _ if !v.same_bracket(bound) => false,
                CompareOp::Lt => v.total_cmp(bound) == Ordering::Less,
                CompareOp::Lte => v.total_cmp(bound) != Ordering::Greater,
                CompareOp::Gt => v.total_cmp(bound) == Ordering::Greater,
                CompareOp::Gte => v.total_cmp(bound) != Ordering::Less,
            },
            Self::In(set) => set.iter().any(|want| v.loose_eq(want)),
            Self::Between { lo, hi } => {
                v.same_bracket(lo)
                    && v.same_bracket(hi)
                    && v.total_cmp(lo) != Ordering::Less
                    && v.total_cmp(hi) != Ordering::Greater
            }
            Self::Like(p) => v.as_text().is_some_and(|s| p.is_match(s)),
        }
    }
}
