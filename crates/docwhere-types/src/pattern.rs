//! SQL `LIKE` patterns compiled into anchored, case-insensitive regexes.
//!
//! Only a leading or trailing `%` acts as a wildcard. A pattern without a
//! leading `%` is anchored at the start, one without a trailing `%` is
//! anchored at the end. Every other character, internal `%` included, matches
//! itself.

use std::fmt;

use docwhere_error::Result;
use regex::{Regex, RegexBuilder};
use serde_json::{Value as JsonValue, json};

/// Regex options rendered next to `$regex` in filter documents.
pub const REGEX_OPTIONS: &str = "i";

/// A compiled `LIKE` pattern.
#[derive(Clone)]
pub struct LikePattern {
    like: String,
    source: String,
    regex: Regex,
}

impl LikePattern {
    /// Translate a SQL `LIKE` pattern.
    ///
    /// # Errors
    ///
    /// Returns [`docwhere_error::WhereError::Pattern`] if the translated
    /// expression exceeds the regex engine's limits.
    pub fn from_sql(like: &str) -> Result<Self> {
        let source = like_to_regex_source(like);
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self {
            like: like.to_owned(),
            source,
            regex,
        })
    }

    /// The regex source, without the case-insensitivity flag.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// `{"$regex": ..., "$options": "i"}`.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        json!({ "$regex": self.source, "$options": REGEX_OPTIONS })
    }
}

/// `%foo` -> `foo$`, `foo%` -> `^foo`, `%foo%` -> `foo`.
fn like_to_regex_source(like: &str) -> String {
    let (anchor_start, rest) = match like.strip_prefix('%') {
        Some(rest) => (false, rest),
        None => (true, like),
    };
    let (anchor_end, body) = match rest.strip_suffix('%') {
        Some(body) => (false, body),
        None => (true, rest),
    };

    let escaped = regex::escape(body);
    let mut source = String::with_capacity(escaped.len() + 2);
    if anchor_start {
        source.push('^');
    }
    source.push_str(&escaped);
    if anchor_end {
        source.push('$');
    }
    source
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LikePattern")
            .field("like", &self.like)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
