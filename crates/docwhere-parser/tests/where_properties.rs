use std::cmp::Ordering;

use docwhere_parser::{Parser, Token, Tokenizer, parse_metrics_snapshot, parse_where};
use docwhere_types::{Constraint, Value};
use proptest::prelude::*;
use serde_json::json;

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}".prop_filter("keywords are not field names", |s| {
        !matches!(s.as_str(), "and" | "or" | "order" | "group" | "limit" | "not")
    })
}

/// Literal text that needs quoting: quotes and backslashes are escaped by
/// `quote_literal`.
fn literal_text() -> impl Strategy<Value = String> {
    "[ -~]{0,24}"
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn bound() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0_i64..100_000).prop_map(Value::Integer),
        "[a-z]{1,8}".prop_map(Value::Text),
    ]
}

fn bound_sql(v: &Value) -> String {
    match v {
        Value::Integer(i) => i.to_string(),
        Value::Text(s) => quote_literal(s),
        other => panic!("unexpected bound {other:?}"),
    }
}

proptest! {
    #[test]
    fn prop_simple_equality(field in field_name(), text in literal_text()) {
        // Backslash escapes the next character, so only texts without one
        // round-trip through plain doubling.
        prop_assume!(!text.contains('\\'));
        let sql = format!("{field} = {}", quote_literal(&text));
        let predicate = parse_where(&sql, false).expect("simple equality parses");
        prop_assert_eq!(predicate.len(), 1);
        prop_assert_eq!(
            predicate.get(&field).cloned(),
            Some(Constraint::Eq(Value::Text(text.clone())))
        );
        prop_assert_eq!(predicate.to_document(), json!({ field: text }));
    }

    #[test]
    fn prop_between_bounds_are_ordered(field in field_name(), a in bound(), b in bound()) {
        let sql = format!("{field} between {} and {}", bound_sql(&a), bound_sql(&b));
        let predicate = parse_where(&sql, false).expect("between parses");
        let Some(Constraint::Between { lo, hi }) = predicate.get(&field) else {
            panic!("expected a range constraint for {sql}");
        };
        prop_assert_ne!(lo.total_cmp(hi), Ordering::Greater);
    }

    #[test]
    fn prop_parse_is_idempotent(
        fields in proptest::collection::vec(field_name(), 1..5),
        n in 0_i64..1000,
        strip in any::<bool>(),
    ) {
        let sql = fields
            .iter()
            .enumerate()
            .map(|(i, f)| match i % 4 {
                0 => format!("t.{f} = {n}"),
                1 => format!("{f} like 'x{n}%'"),
                2 => format!("{f} in ({n}, 'v')"),
                _ => format!("{f} between {n} and 7"),
            })
            .collect::<Vec<_>>()
            .join(" and ");
        let first = parse_where(&sql, strip).expect("first parse");
        let second = parse_where(&sql, strip).expect("second parse");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_pushback_round_trip(sql in "[a-z<>=(),' ]{1,20}") {
        let mut tokenizer = Tokenizer::new(&sql);
        if let Ok(Some(tok)) = tokenizer.next_token() {
            let rest_before = tokenizer.rest();
            tokenizer.push_back(tok.clone());
            prop_assert_eq!(tokenizer.next_token().expect("pushed token"), Some(tok));
            prop_assert_eq!(tokenizer.rest(), rest_before);
        }
    }
}

#[test]
fn test_doubled_quote_round_trip() {
    let mut tokenizer = Tokenizer::new("'it''s a test'");
    assert_eq!(
        tokenizer.next_token().expect("token"),
        Some(Token::Str("it's a test".to_owned()))
    );
    assert_eq!(tokenizer.next_token().expect("end"), None);
}

#[test]
fn test_books_fixture_queries() {
    let books = [
        json!({ "title": "Book 01", "n": 1 }),
        json!({ "title": "Book 02", "n": 2 }),
        json!({ "title": "Book 03", "n": 3 }),
        json!({ "title": "Other", "n": 4 }),
    ];
    let count = |sql: &str| {
        let predicate = parse_where(sql, true).expect("fixture query parses");
        books.iter().filter(|b| predicate.matches(b)).count()
    };

    assert_eq!(count("title like 'book%'"), 3);
    assert_eq!(count("title like '%01'"), 1);
    assert_eq!(count("books.title in ('Book 01','Book 02','Book 03')"), 3);
    assert_eq!(count("n between 3 and 1"), 3);
    assert_eq!(count("n > 1 and title like 'Book%'"), 2);
    assert_eq!(count("n <> 4"), 3);
    assert_eq!(count(""), 4);
}

#[test]
fn test_trailing_order_is_left_for_caller() {
    let mut parser = Parser::new(Tokenizer::new("title = 'x' order by title"));
    parser.parse_where(false).expect("parses");
    let tokenizer = parser.tokenizer_mut();
    assert_eq!(
        tokenizer.next_token().expect("pushed"),
        Some(Token::Word("order".to_owned()))
    );
}

#[test]
fn test_metrics_advance() {
    let before = parse_metrics_snapshot();
    parse_where("a = 1 and b = 2", false).expect("parses");
    parse_where("a = 1 or b = 2", false).expect_err("rejected");
    let after = parse_metrics_snapshot();
    assert!(after.docwhere_parses_total >= before.docwhere_parses_total + 2);
    assert!(after.docwhere_parses_ok_total > before.docwhere_parses_ok_total);
    assert!(after.docwhere_syntax_errors_total > before.docwhere_syntax_errors_total);
    assert!(after.docwhere_predicate_fields_total >= before.docwhere_predicate_fields_total + 2);
    assert!(after.docwhere_tokens_total >= before.docwhere_tokens_total + 11);
}
