//! Translation settings owned by a [`Criteria`](crate::Criteria) value.

use docwhere_error::{Result, WhereError};
use serde::{Deserialize, Serialize};

/// Settings for turning SQL conditions into document filters.
///
/// Every field has a default, so a partial TOML table such as
/// `primary_key = "key"` deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaConfig {
    /// Store `schema.table.col` as `col`.
    pub strip_table_qualifiers: bool,
    /// Document field that holds the record id.
    pub primary_key: String,
    /// Field names rewritten to `primary_key` in hash conditions,
    /// projections and sort keys.
    pub id_aliases: Vec<String>,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            strip_table_qualifiers: true,
            primary_key: "_id".to_owned(),
            id_aliases: vec!["id".to_owned()],
        }
    }
}

impl CriteriaConfig {
    /// Reject settings that cannot produce a usable filter.
    ///
    /// # Errors
    ///
    /// Returns [`WhereError::Config`] when the primary key is empty or an
    /// alias is empty.
    pub fn validate(&self) -> Result<()> {
        if self.primary_key.trim().is_empty() {
            return Err(WhereError::Config("primary_key must not be empty".to_owned()));
        }
        if self.id_aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(WhereError::Config("id_aliases must not contain empty names".to_owned()));
        }
        Ok(())
    }

    /// Whether `field` names the record id under another name.
    #[must_use]
    pub fn is_id_alias(&self, field: &str) -> bool {
        self.id_aliases.iter().any(|a| a == field)
    }

    /// `field` with id aliases rewritten to the primary key.
    #[must_use]
    pub fn canonical_field<'a>(&'a self, field: &'a str) -> &'a str {
        if self.is_id_alias(field) {
            &self.primary_key
        } else {
            field
        }
    }

    /// Apply qualifier stripping and alias rewriting to a column name.
    #[must_use]
    pub fn column(&self, name: &str) -> String {
        let name = if self.strip_table_qualifiers {
            name.rsplit('.').next().unwrap_or(name)
        } else {
            name
        };
        self.canonical_field(name).to_owned()
    }
}
