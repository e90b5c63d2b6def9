//! Hand-written tokenizer and recursive descent parser that turns the body of
//! a SQL WHERE clause into a document-store [`Predicate`].
//!
//! The accepted dialect is a flat conjunction of `field op value` triples;
//! see [`parser`] for the operator table.
//!
//! [`Predicate`]: docwhere_types::Predicate

pub mod lexer;
pub mod metrics;
pub mod parser;
pub mod token;

pub use lexer::Tokenizer;
pub use metrics::{ParseMetricsSnapshot, parse_metrics_snapshot, reset_parse_metrics};
pub use parser::{Parser, TRAILING_CLAUSE_KEYWORDS, parse_where};
pub use token::Token;
