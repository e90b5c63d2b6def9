//! Error types shared by every docwhere crate.
//!
//! The parser has exactly one failure mode, [`WhereError::Syntax`]. The
//! remaining variants belong to the condition-translation layer that sits on
//! top of it (bind substitution, LIKE compilation, configuration loading).

use thiserror::Error;

/// Primary error type for docwhere.
#[derive(Debug, Error)]
pub enum WhereError {
    /// Malformed or unsupported WHERE-clause text.
    ///
    /// `sql` is always the complete source fragment handed to the parser, not
    /// the remaining suffix, so the message is diagnosable on its own.
    #[error("{detail}: {sql}")]
    Syntax { detail: String, sql: String },

    /// Positional `?` placeholders and supplied values disagree in count.
    #[error("wrong number of bind variables ({actual} for {expected}) in: {sql}")]
    BindCount {
        expected: usize,
        actual: usize,
        sql: String,
    },

    /// A `:name` placeholder has no matching value.
    #[error("missing value for :{name} in: {sql}")]
    MissingBind { name: String, sql: String },

    /// A bind value has no literal form that reads back as the same value.
    #[error("cannot bind {value}: no WHERE literal reads back as it, in: {sql}")]
    UnrepresentableBind { value: String, sql: String },

    /// A LIKE pattern failed to compile into a regular expression.
    #[error("invalid LIKE pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl WhereError {
    /// Build a [`WhereError::Syntax`] for `sql`.
    pub fn syntax(detail: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Syntax {
            detail: detail.into(),
            sql: sql.into(),
        }
    }

    /// Whether this is a parser-level syntax failure.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// The source fragment the error refers to, when there is one.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Syntax { sql, .. }
            | Self::BindCount { sql, .. }
            | Self::MissingBind { sql, .. }
            | Self::UnrepresentableBind { sql, .. } => Some(sql),
            Self::Pattern(_) | Self::Config(_) => None,
        }
    }
}

/// Result alias using [`WhereError`].
pub type Result<T> = std::result::Result<T, WhereError>;
