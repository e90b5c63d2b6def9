//! Token types produced by the [`Tokenizer`](crate::Tokenizer).

use std::borrow::Cow;
use std::fmt;

use docwhere_types::Value;

/// A lexical unit of a WHERE fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Quote-delimited literal with the quotes stripped and escapes resolved.
    Str(String),
    /// A bare token made only of ASCII digits that fits in an `i64`.
    Integer(i64),
    /// Identifier, keyword or operator symbol (`title`, `AND`, `<=`, `(`).
    Word(String),
}

impl Token {
    /// Bare word text, if this is a [`Token::Word`].
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Exact match against a bare word (punctuation, operators).
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.as_word() == Some(word)
    }

    /// Case-insensitive match against a bare keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.as_word().is_some_and(|w| w.eq_ignore_ascii_case(keyword))
    }

    /// Textual content regardless of kind.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Str(s) | Self::Word(s) => Cow::Borrowed(s),
            Self::Integer(i) => Cow::Owned(i.to_string()),
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Str(s) | Self::Word(s) => s,
            Self::Integer(i) => i.to_string(),
        }
    }

    /// Literal value of the token when used as a constraint operand.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Integer(i) => Value::Integer(i),
            Self::Str(s) | Self::Word(s) => Value::Text(s),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Word(w) => f.write_str(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_matching_ignores_case_but_not_kind() {
        assert!(Token::Word("AnD".to_owned()).is_keyword("and"));
        assert!(!Token::Str("and".to_owned()).is_keyword("and"));
        assert!(Token::Word("(".to_owned()).is_word("("));
        assert!(!Token::Word("((".to_owned()).is_word("("));
    }

    #[test]
    fn test_values() {
        assert_eq!(Token::Integer(7).into_value(), Value::Integer(7));
        assert_eq!(Token::Word("NULL".to_owned()).into_value(), Value::from("NULL"));
        assert_eq!(Token::Integer(12).text(), "12");
    }

    #[test]
    fn test_display_requotes_strings() {
        assert_eq!(Token::Str("it's".to_owned()).to_string(), "'it''s'");
        assert_eq!(Token::Word("<=".to_owned()).to_string(), "<=");
    }
}
