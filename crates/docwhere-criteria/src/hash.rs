//! Hash-style conditions: `{field => value}` maps built in code rather than
//! parsed from SQL text.

use std::ops::RangeInclusive;

use docwhere_types::{Constraint, Value};

/// Right-hand side of one hash-condition entry.
#[derive(Debug, Clone, PartialEq)]
pub enum HashCondition {
    /// Equality.
    Value(Value),
    /// Membership (`$in`).
    List(Vec<Value>),
    /// Inclusive range (`$gte` / `$lte`).
    Range { start: Value, end: Value },
}

impl HashCondition {
    #[must_use]
    pub fn into_constraint(self) -> Constraint {
        match self {
            Self::Value(value) => Constraint::Eq(value),
            Self::List(values) => Constraint::In(values),
            Self::Range { start, end } => Constraint::between(start, end),
        }
    }
}

impl From<Value> for HashCondition {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<Value>> for HashCondition {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl From<RangeInclusive<Value>> for HashCondition {
    fn from(range: RangeInclusive<Value>) -> Self {
        let (start, end) = range.into_inner();
        Self::Range { start, end }
    }
}

impl From<RangeInclusive<i64>> for HashCondition {
    fn from(range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        Self::Range {
            start: Value::Integer(start),
            end: Value::Integer(end),
        }
    }
}

impl From<&str> for HashCondition {
    fn from(text: &str) -> Self {
        Self::Value(Value::from(text))
    }
}

impl From<i64> for HashCondition {
    fn from(n: i64) -> Self {
        Self::Value(Value::Integer(n))
    }
}
