//! Recursive descent parser for flat WHERE conjunctions.
//!
//! Accepts the subset of SQL an ORM emits for simple finders:
//! `a = 1 AND b < 2 AND c LIKE 'x%' AND d IN (1, 2) AND e BETWEEN 1 AND 9`.
//! Nested grouping and `OR` are rejected outright. A trailing `ORDER`,
//! `GROUP` or `LIMIT` keyword ends the predicate and is pushed back onto the
//! tokenizer for the caller.

use docwhere_error::{Result, WhereError};
use docwhere_types::{Constraint, LikePattern, Predicate, Value};
use tracing::debug;

use crate::lexer::Tokenizer;
use crate::metrics;
use crate::token::Token;

/// Keywords that start a clause this parser does not own.
pub const TRAILING_CLAUSE_KEYWORDS: [&str; 3] = ["order", "group", "limit"];

/// Parse a WHERE clause body (without the `WHERE`) into a [`Predicate`].
///
/// With `strip_table_qualifiers`, `schema.table.col` is stored as `col`.
///
/// # Errors
///
/// Returns [`WhereError::Syntax`] for anything outside the supported subset.
pub fn parse_where(sql: &str, strip_table_qualifiers: bool) -> Result<Predicate> {
    Parser::new(Tokenizer::new(sql)).parse_where(strip_table_qualifiers)
}

/// Single-pass WHERE parser over a [`Tokenizer`].
#[derive(Debug)]
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub const fn new(tokenizer: Tokenizer<'a>) -> Self {
        Self { tokenizer }
    }

    /// Access the tokenizer, e.g. to read a pushed-back `ORDER` keyword.
    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer<'a> {
        &mut self.tokenizer
    }

    #[must_use]
    pub fn into_tokenizer(self) -> Tokenizer<'a> {
        self.tokenizer
    }

    /// Parse the remaining input as a flat conjunction.
    ///
    /// # Errors
    ///
    /// Returns [`WhereError::Syntax`]; no partial predicate is returned.
    pub fn parse_where(&mut self, strip_table_qualifiers: bool) -> Result<Predicate> {
        metrics::record_parse_start();
        match self.parse_conjunction(strip_table_qualifiers) {
            Ok(predicate) => {
                metrics::record_parse_ok(predicate.len());
                debug!(
                    fields = predicate.len(),
                    trailing_clause = self.tokenizer.peek_pushed().is_some(),
                    "parsed where fragment"
                );
                Ok(predicate)
            }
            Err(err) => {
                metrics::record_syntax_error();
                debug!(error = %err, "rejected where fragment");
                Err(err)
            }
        }
    }

    fn parse_conjunction(&mut self, strip_table_qualifiers: bool) -> Result<Predicate> {
        let mut predicate = Predicate::new();

        while self.tokenizer.has_more() {
            let name = self.expect("expected a field name")?;
            if name.is_word("(") {
                return Err(self.error("sql parser can't handle nested stuff yet"));
            }
            let mut field = name.into_text();
            if strip_table_qualifiers {
                if let Some(dot) = field.rfind('.') {
                    field.drain(..=dot);
                }
            }

            let op = self.read_operator()?;
            let constraint = self.read_constraint(&op)?;
            predicate.insert(field, constraint);

            if !self.tokenizer.has_more() {
                break;
            }
            let next = self.expect("expected AND")?;
            let keyword = next.as_word().map(str::to_ascii_lowercase);
            match keyword.as_deref() {
                Some("and") => {}
                Some("or") => return Err(self.error("sql parser can't handle ors yet")),
                Some(kw) if TRAILING_CLAUSE_KEYWORDS.contains(&kw) => {
                    self.tokenizer.push_back(Token::Word(kw.to_owned()));
                    break;
                }
                _ => return Err(self.error(format!("can't handle [{next}] yet"))),
            }
        }

        Ok(predicate)
    }

    /// Read a comparison operator, lower-cased. `NOT` joins exactly one
    /// following token (`not in`, `not like`, `not between`).
    fn read_operator(&mut self) -> Result<String> {
        let tok = self.expect("expected an operator")?;
        let Some(word) = tok.as_word() else {
            return Err(self.error(format!("can't handle sql operator [{tok}] yet")));
        };
        let mut op = word.to_ascii_lowercase();
        if op == "not" {
            let negated = self.expect("expected an operator after NOT")?;
            op.push(' ');
            op.push_str(&negated.text().to_ascii_lowercase());
        }
        Ok(op)
    }

    fn read_constraint(&mut self, op: &str) -> Result<Constraint> {
        let constraint = match op {
            "=" => Constraint::Eq(self.read_value()?),
            "<" => Constraint::lt(self.read_value()?),
            "<=" => Constraint::lte(self.read_value()?),
            ">" => Constraint::gt(self.read_value()?),
            ">=" => Constraint::gte(self.read_value()?),
            "<>" | "!=" => Constraint::ne(self.read_value()?),
            "like" => {
                let pattern = self.expect("expected a LIKE pattern")?;
                Constraint::Like(LikePattern::from_sql(&pattern.text())?)
            }
            "in" => {
                let open = self.expect("expected a list after IN")?;
                if !open.is_word("(") {
                    return Err(self.error("'in' must be followed by a list of values"));
                }
                Constraint::In(self.read_list()?)
            }
            "between" => {
                let lo = self.read_value()?;
                let conjunction = self.expect("expected 'between X and Y'")?;
                if !conjunction.is_keyword("and") {
                    return Err(self.error(format!(
                        "syntax error: expected 'between X and Y', \
                         but saw '{conjunction}' instead of 'and'"
                    )));
                }
                let hi = self.read_value()?;
                Constraint::between(lo, hi)
            }
            _ => return Err(self.error(format!("can't handle sql operator [{op}] yet"))),
        };
        Ok(constraint)
    }

    /// Read `v1, v2, ... )` after an opening parenthesis. `( )` is an empty
    /// set; `()` lexes as one token and never gets here.
    fn read_list(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(tok) = self.tokenizer.next_token()? {
            if values.is_empty() && tok.is_word(")") {
                return Ok(values);
            }
            values.push(tok.into_value());
            match self.tokenizer.next_token()? {
                Some(sep) if sep.is_word(")") => return Ok(values),
                Some(sep) if sep.is_word(",") => {}
                Some(_) => return Err(self.error("missing ',' in 'in' list of values")),
                None => break,
            }
        }
        Err(self.error("missing ')' at end of 'in' list of values"))
    }

    fn read_value(&mut self) -> Result<Value> {
        Ok(self.expect("expected a value")?.into_value())
    }

    fn expect(&mut self, what: &str) -> Result<Token> {
        match self.tokenizer.next_token()? {
            Some(tok) => Ok(tok),
            None => Err(self.error(format!("unexpected end of input, {what}"))),
        }
    }

    fn error(&self, detail: impl Into<String>) -> WhereError {
        WhereError::syntax(detail, self.tokenizer.sql())
    }
}

#[cfg(test)]
mod tests {
    use docwhere_types::CompareOp;
    use serde_json::json;

    use super::*;

    fn parse(sql: &str) -> Predicate {
        parse_where(sql, false).expect("should parse")
    }

    fn parse_err(sql: &str) -> WhereError {
        parse_where(sql, false).expect_err("should be rejected")
    }

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_equality() {
        let p = parse("title = 'Book 01'");
        assert_eq!(p.get("title"), Some(&Constraint::Eq(text("Book 01"))));
        assert_eq!(p.to_document(), json!({ "title": "Book 01" }));
    }

    #[test]
    fn test_comparisons() {
        let p = parse("a < 1 and b <= 2 AND c > 3 and d >= 4 and e <> 5 and f != 'x'");
        assert_eq!(
            p.to_document(),
            json!({
                "a": { "$lt": 1 },
                "b": { "$lte": 2 },
                "c": { "$gt": 3 },
                "d": { "$gte": 4 },
                "e": { "$ne": 5 },
                "f": { "$ne": "x" },
            })
        );
        assert_eq!(
            p.get("e"),
            Some(&Constraint::Compare(CompareOp::Ne, Value::Integer(5)))
        );
    }

    #[test]
    fn test_bare_word_value_is_text() {
        let p = parse("a = b");
        assert_eq!(p.get("a"), Some(&Constraint::Eq(text("b"))));
    }

    #[test]
    fn test_operator_case_is_normalised() {
        let p = parse("title LIKE 'Book%' AnD n In (1)");
        assert!(matches!(p.get("title"), Some(Constraint::Like(_))));
        assert_eq!(p.get("n"), Some(&Constraint::In(vec![Value::Integer(1)])));
    }

    #[test]
    fn test_like_anchoring() {
        let p = parse("title like 'Book%'");
        assert!(p.matches(&json!({ "title": "book 01" })));
        assert!(!p.matches(&json!({ "title": "a book" })));

        let p = parse("title like '%01'");
        assert!(p.matches(&json!({ "title": "Book 01" })));
        assert!(!p.matches(&json!({ "title": "Book 02" })));

        let p = parse("title like '%k 0%'");
        assert_eq!(p.to_document(), json!({ "title": { "$regex": "k 0", "$options": "i" } }));
    }

    #[test]
    fn test_in_list() {
        let p = parse("title in ('Book 01','Book 02','Book 03')");
        let Some(Constraint::In(values)) = p.get("title") else {
            panic!("expected an IN constraint");
        };
        assert_eq!(values.len(), 3);
        assert!(p.matches(&json!({ "title": "Book 02" })));
        assert!(!p.matches(&json!({ "title": "Book 04" })));
    }

    #[test]
    fn test_adjacent_parens_are_not_a_list() {
        let err = parse_err("a in ()");
        assert!(err.to_string().contains("must be followed by a list"));
        assert_eq!(err.sql(), Some("a in ()"));
    }

    #[test]
    fn test_spaced_empty_in_list() {
        let p = parse("a in ( ) and b = 1");
        assert_eq!(p.get("a"), Some(&Constraint::In(vec![])));
        assert!(!p.matches(&json!({ "a": 1, "b": 1 })));
    }

    #[test]
    fn test_in_list_errors() {
        let err = parse_err("a in 'x'");
        assert!(err.to_string().contains("must be followed by a list"));
        let err = parse_err("a in (1 2)");
        assert!(err.to_string().contains("missing ','"));
        let err = parse_err("a in (1, 2");
        assert!(err.to_string().contains("missing ')'"));
        let err = parse_err("a in (");
        assert!(err.to_string().contains("missing ')'"));
    }

    #[test]
    fn test_between_swaps_bounds() {
        let p = parse("n between 10 and 2");
        assert_eq!(
            p.get("n"),
            Some(&Constraint::Between {
                lo: Value::Integer(2),
                hi: Value::Integer(10)
            })
        );
        let p = parse("t BETWEEN 'b' AND 'a'");
        assert_eq!(p.to_document(), json!({ "t": { "$gte": "a", "$lte": "b" } }));
    }

    #[test]
    fn test_between_then_more_clauses() {
        let p = parse("n between 1 and 5 and name = 'x'");
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("name"), Some(&Constraint::Eq(text("x"))));
    }

    #[test]
    fn test_between_requires_and() {
        let err = parse_err("n between 1 or 5");
        assert!(err.to_string().contains("instead of 'and'"));
        assert!(err.to_string().contains("n between 1 or 5"));
    }

    #[test]
    fn test_strip_table_qualifiers() {
        let p = parse_where("db.books.title = 'x' and books.n = 1 and plain = 2", true)
            .expect("should parse");
        assert_eq!(p.fields().collect::<Vec<_>>(), vec!["n", "plain", "title"]);

        let p = parse("books.title = 'x'");
        assert!(p.contains("books.title"));
    }

    #[test]
    fn test_later_field_overwrites_earlier() {
        let p = parse("a = 1 and a = 2");
        assert_eq!(p.len(), 1);
        assert_eq!(p.get("a"), Some(&Constraint::Eq(Value::Integer(2))));
    }

    #[test]
    fn test_or_is_rejected() {
        let err = parse_err("a = 1 or b = 2");
        assert!(err.is_syntax());
        assert!(err.to_string().contains("ors"));
        assert!(err.to_string().contains("a = 1 or b = 2"));
    }

    #[test]
    fn test_nested_grouping_is_rejected() {
        let err = parse_err("a = 1 and (");
        assert!(err.to_string().contains("nested"));
        let err = parse_err("(a = 1)");
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_err("a ~ 1");
        assert!(err.to_string().contains("[~]"));
        let err = parse_err("a 'op' 1");
        assert!(err.to_string().contains("can't handle sql operator"));
    }

    #[test]
    fn test_not_joins_one_token() {
        let err = parse_err("a not in (1)");
        assert!(err.to_string().contains("[not in]"));
        let err = parse_err("a NOT LIKE 'x'");
        assert!(err.to_string().contains("[not like]"));
    }

    #[test]
    fn test_unexpected_trailing_token() {
        let err = parse_err("a = 1 b = 2");
        assert!(err.to_string().contains("can't handle [b] yet"));
    }

    #[test]
    fn test_missing_operand() {
        assert!(parse_err("a").to_string().contains("expected an operator"));
        assert!(parse_err("a =").to_string().contains("expected a value"));
    }

    #[test]
    fn test_dangling_and_ends_input() {
        let p = parse("a = 1 and");
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_trailing_clause_is_pushed_back() {
        let mut parser = Parser::new(Tokenizer::new("title = 'x' ORDER BY title desc"));
        let p = parser.parse_where(false).expect("should parse");
        assert_eq!(p.len(), 1);
        let tokenizer = parser.tokenizer_mut();
        assert_eq!(
            tokenizer.next_token().expect("tok"),
            Some(Token::Word("order".to_owned()))
        );
        assert_eq!(
            tokenizer.next_token().expect("tok"),
            Some(Token::Word("BY".to_owned()))
        );
        assert_eq!(tokenizer.rest(), " title desc");
    }

    #[test]
    fn test_group_and_limit_stop_parsing() {
        for sql in ["a = 1 group by a", "a = 1 LIMIT 5"] {
            let mut parser = Parser::new(Tokenizer::new(sql));
            let p = parser.parse_where(false).expect("should parse");
            assert_eq!(p.len(), 1);
            assert!(parser.into_tokenizer().peek_pushed().is_some());
        }
    }

    #[test]
    fn test_empty_fragment() {
        assert!(parse("").is_empty());
        assert!(parse("  \n ").is_empty());
    }

    #[test]
    fn test_unterminated_string_aborts() {
        let err = parse_err("a = 'x");
        assert!(err.to_string().contains("unterminated"));
    }
}
