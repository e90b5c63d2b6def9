//! Core types for docwhere: values, per-field constraints, predicates and the
//! find options that travel with them.
//!
//! A [`Predicate`] renders to the filter-document dialect understood by
//! document query engines (`$lt`, `$lte`, `$gt`, `$gte`, `$ne`, `$in`,
//! `$regex`, implicit equality, implicit AND across fields) and can also be
//! evaluated directly against a JSON document.

pub mod constraint;
pub mod options;
pub mod pattern;
pub mod predicate;
pub mod value;

pub use constraint::{CompareOp, Constraint};
pub use options::{FindOptions, Projection, SortDirection, SortSpec};
pub use pattern::LikePattern;
pub use predicate::Predicate;
pub use value::Value;
