//! Tokenizer for WHERE fragments.
//!
//! Tokens are produced lazily from an immutable source string. A LIFO stack
//! of pushed-back tokens gives callers one token of lookahead without
//! consuming it from the parser's point of view.

use docwhere_error::{Result, WhereError};
use memchr::memchr2;

use crate::metrics;
use crate::token::Token;

const BACKSLASH: u8 = b'\\';

/// Insignificant between tokens.
const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Identifier class: ASCII letters, digits, `_` and `.` (so `schema.table.col`
/// lexes as one token). Everything else is the operator class.
const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

const fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Single-pass tokenizer over a WHERE fragment.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    sql: &'a str,
    pos: usize,
    pushed: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new(sql: &'a str) -> Self {
        Self {
            sql,
            pos: 0,
            pushed: Vec::new(),
        }
    }

    /// The complete source fragment.
    #[must_use]
    pub const fn sql(&self) -> &'a str {
        self.sql
    }

    /// Unconsumed source text. Pushed-back tokens are not included.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.sql[self.pos..]
    }

    /// Return `tok` to the stream; the next [`next_token`](Self::next_token)
    /// yields it before reading any more source.
    pub fn push_back(&mut self, tok: Token) {
        self.pushed.push(tok);
    }

    /// The token that the next read will return from the pushback stack.
    #[must_use]
    pub fn peek_pushed(&self) -> Option<&Token> {
        self.pushed.last()
    }

    /// Whether any token (pushed back or unread) remains.
    pub fn has_more(&mut self) -> bool {
        if !self.pushed.is_empty() {
            return true;
        }
        self.skip_whitespace();
        self.pos < self.sql.len()
    }

    fn skip_whitespace(&mut self) {
        let skipped = self.sql[self.pos..]
            .find(|c: char| !is_whitespace(c))
            .unwrap_or(self.sql.len() - self.pos);
        self.pos += skipped;
    }

    /// Produce the next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for an unterminated string literal.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(tok) = self.pushed.pop() {
            return Ok(Some(tok));
        }

        self.skip_whitespace();
        let Some(first) = self.sql[self.pos..].chars().next() else {
            return Ok(None);
        };

        let tok = if is_quote(first) {
            Token::Str(self.read_string(first)?)
        } else {
            self.read_bare(first)
        };
        metrics::record_token();
        Ok(Some(tok))
    }

    /// Read a literal delimited by `quote`, starting at the opening quote.
    ///
    /// A doubled quote is one literal quote. A backslash copies the next
    /// character verbatim; a trailing backslash ends the literal.
    fn read_string(&mut self, quote: char) -> Result<String> {
        // Quote and backslash are ASCII, so every index memchr reports is a
        // char boundary.
        let sql = self.sql;
        let q = quote as u8;
        let bytes = sql.as_bytes();
        self.pos += 1;
        let mut out = String::new();

        while let Some(offset) = memchr2(q, BACKSLASH, &bytes[self.pos..]) {
            let at = self.pos + offset;
            out.push_str(&sql[self.pos..at]);

            if bytes[at] == BACKSLASH {
                let Some(escaped) = sql[at + 1..].chars().next() else {
                    self.pos = sql.len();
                    return Ok(out);
                };
                out.push(escaped);
                self.pos = at + 1 + escaped.len_utf8();
            } else if bytes.get(at + 1) == Some(&q) {
                out.push(quote);
                self.pos = at + 2;
            } else {
                self.pos = at + 1;
                return Ok(out);
            }
        }

        self.pos = sql.len();
        Err(WhereError::syntax("unterminated string in SQL", sql))
    }

    /// Read a maximal run of same-class characters starting with `first`.
    fn read_bare(&mut self, first: char) -> Token {
        let start = self.pos;
        let identifier = is_identifier_char(first);
        let mut end = start + first.len_utf8();

        for c in self.sql[end..].chars() {
            if is_whitespace(c) || is_identifier_char(c) != identifier {
                break;
            }
            if !identifier && is_quote(c) {
                break;
            }
            end += c.len_utf8();
        }
        self.pos = end;

        let text = &self.sql[start..end];
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.parse::<i64>() {
                return Token::Integer(n);
            }
        }
        Token::Word(text.to_owned())
    }
}
