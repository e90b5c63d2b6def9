//! Condition translation on top of the WHERE parser.
//!
//! [`Criteria`] is the entry point. Besides plain WHERE fragments it accepts
//! templates with `?`, `:name` or `%s` bind variables, hash conditions built
//! in code, id lists, complete statements (only the WHERE clause is used),
//! server-side `$where` functions and the `ORDER BY` / `LIMIT` / `OFFSET`
//! clauses that may follow a fragment.

pub mod binds;
pub mod config;
pub mod criteria;
pub mod hash;
pub mod statement;
mod trailing;

pub use binds::{bind_format, bind_named, bind_positional, quote_value};
pub use config::CriteriaConfig;
pub use criteria::{Criteria, WHERE_FUNC_FIELD};
pub use hash::HashCondition;
pub use statement::where_fragment;
