//! Translation of the clauses that may follow a WHERE body:
//! `ORDER BY key [ASC|DESC], ...`, `LIMIT n` and `OFFSET m`.

use docwhere_error::{Result, WhereError};
use docwhere_parser::{Token, Tokenizer};
use docwhere_types::{FindOptions, SortDirection, SortSpec};

use crate::config::CriteriaConfig;

fn is_direction(tok: &Token) -> bool {
    tok.as_word().is_some_and(|w| {
        let lower = w.to_ascii_lowercase();
        lower.starts_with("asc") || lower.starts_with("desc")
    })
}

/// Read trailing clauses until the tokenizer is exhausted.
///
/// Clauses must appear in SQL order and at most once each; `OFFSET` needs a
/// preceding `LIMIT`.
pub fn read_trailing(
    tokenizer: &mut Tokenizer<'_>,
    config: &CriteriaConfig,
) -> Result<FindOptions> {
    let mut options = FindOptions::default();

    while let Some(tok) = tokenizer.next_token()? {
        let keyword = tok.as_word().map(str::to_ascii_lowercase);
        match keyword.as_deref() {
            Some("order") if options.sort.is_none() && options.limit.is_none() => {
                let by = expect(tokenizer, "expected BY after ORDER")?;
                if !by.is_keyword("by") {
                    return Err(error(tokenizer, format!("expected BY after ORDER, saw [{by}]")));
                }
                options.sort = Some(read_sort_keys(tokenizer, config)?);
            }
            Some("limit") if options.limit.is_none() => {
                options.limit = Some(read_count(tokenizer, "LIMIT")?);
            }
            Some("offset") if options.limit.is_some() && options.offset.is_none() => {
                options.offset = Some(read_count(tokenizer, "OFFSET")?);
            }
            Some("group") => return Err(error(tokenizer, "sql parser can't handle group by yet")),
            _ => return Err(error(tokenizer, format!("can't handle [{tok}] yet"))),
        }
    }

    Ok(options)
}

fn read_sort_keys(tokenizer: &mut Tokenizer<'_>, config: &CriteriaConfig) -> Result<SortSpec> {
    let mut sort = SortSpec::new();
    loop {
        let key = expect(tokenizer, "expected a sort key")?;
        if key.is_word(",") {
            return Err(error(tokenizer, "empty sort key in ORDER BY"));
        }
        let field = config.column(&key.text());

        let mut next = tokenizer.next_token()?;
        let mut direction = SortDirection::Ascending;
        if let Some(tok) = next.take_if(|t| is_direction(t)) {
            direction = SortDirection::from_word(&tok.text());
            next = tokenizer.next_token()?;
        }
        sort.push(field, direction);

        match next {
            Some(sep) if sep.is_word(",") => {}
            Some(other) => {
                tokenizer.push_back(other);
                return Ok(sort);
            }
            None => return Ok(sort),
        }
    }
}

fn read_count(tokenizer: &mut Tokenizer<'_>, clause: &str) -> Result<u64> {
    let what = format!("expected a row count after {clause}");
    match expect(tokenizer, &what)? {
        Token::Integer(n) => u64::try_from(n).map_err(|_| error(tokenizer, what)),
        other => Err(error(tokenizer, format!("{what}, saw [{other}]"))),
    }
}

fn expect(tokenizer: &mut Tokenizer<'_>, what: &str) -> Result<Token> {
    match tokenizer.next_token()? {
        Some(tok) => Ok(tok),
        None => Err(error(tokenizer, format!("unexpected end of input, {what}"))),
    }
}

fn error(tokenizer: &Tokenizer<'_>, detail: impl Into<String>) -> WhereError {
    WhereError::syntax(detail, tokenizer.sql())
}
