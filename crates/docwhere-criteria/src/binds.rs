//! Bind-variable substitution for condition templates.
//!
//! Placeholders are positional `?`, named `:name`, or printf-style `%s`
//! (with `%%` for a literal percent sign). Quoted literals are copied
//! verbatim in every style, so `'a?b'`, `'10:30'` and `'50%'` are left alone,
//! and `::` (a cast) is not a placeholder.
//!
//! Values are rendered as SQL literals the tokenizer reads back unchanged.
//! Values with no such literal are rejected rather than bound as something
//! else: the grammar has no negative numbers, no floats, no booleans and no
//! null.

use std::collections::BTreeMap;

use docwhere_error::{Result, WhereError};
use docwhere_types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Positional,
    Named(&'a str),
}

/// Which placeholders [`scan`] recognises outside quoted literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// `?` and `:name`.
    Bind,
    /// `%s` and `%%`.
    Printf,
}

const fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split `template` into literal text and placeholders.
///
/// All delimiters are ASCII, so every slice boundary is a char boundary.
fn scan(template: &str, style: Style) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                if bytes.get(i + 1) == Some(&q) {
                    i += 2;
                    continue;
                }
                quote = None;
            }
            i += 1;
            continue;
        }

        match (style, b) {
            (_, b'\'' | b'"') => {
                quote = Some(b);
                i += 1;
            }
            (Style::Bind, b'?') => {
                pieces.push(Piece::Text(&template[start..i]));
                pieces.push(Piece::Positional);
                i += 1;
                start = i;
            }
            (Style::Bind, b':') if bytes.get(i + 1) == Some(&b':') => i += 2,
            (Style::Bind, b':') if bytes.get(i + 1).is_some_and(|&c| is_name_start(c)) => {
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && is_name_char(bytes[end]) {
                    end += 1;
                }
                pieces.push(Piece::Text(&template[start..i]));
                pieces.push(Piece::Named(&template[name_start..end]));
                i = end;
                start = end;
            }
            (Style::Printf, b'%') if bytes.get(i + 1) == Some(&b's') => {
                pieces.push(Piece::Text(&template[start..i]));
                pieces.push(Piece::Positional);
                i += 2;
                start = i;
            }
            (Style::Printf, b'%') if bytes.get(i + 1) == Some(&b'%') => {
                pieces.push(Piece::Text(&template[start..=i]));
                i += 2;
                start = i;
            }
            _ => i += 1,
        }
    }
    pieces.push(Piece::Text(&template[start..]));
    pieces
}

/// Render `value` as a SQL literal the tokenizer reads back as `value`.
///
/// Text is single-quoted with `'` doubled and `\` doubled; a non-negative
/// integer is its digits. Anything else has no such literal and yields
/// `None`.
#[must_use]
pub fn quote_value(value: &Value) -> Option<String> {
    match value {
        Value::Integer(i) if *i >= 0 => Some(i.to_string()),
        Value::Text(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\'' => out.push_str("''"),
                    '\\' => out.push_str("\\\\"),
                    c => out.push(c),
                }
            }
            out.push('\'');
            Some(out)
        }
        Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => None,
    }
}

fn bind_literal(value: &Value, template: &str) -> Result<String> {
    quote_value(value).ok_or_else(|| WhereError::UnrepresentableBind {
        value: value.to_string(),
        sql: template.to_owned(),
    })
}

/// Replace each `?` in `template` with the next value.
///
/// # Errors
///
/// Returns [`WhereError::BindCount`] when the number of placeholders differs
/// from `values.len()`, or [`WhereError::UnrepresentableBind`] for a value
/// [`quote_value`] cannot render.
pub fn bind_positional(template: &str, values: &[Value]) -> Result<String> {
    fill_positional(template, scan(template, Style::Bind), values)
}

/// Replace each `%s` in `template` with the next value and each `%%` with
/// `%`. Any other `%` is copied as is.
///
/// # Errors
///
/// Same as [`bind_positional`].
pub fn bind_format(template: &str, values: &[Value]) -> Result<String> {
    fill_positional(template, scan(template, Style::Printf), values)
}

fn fill_positional(template: &str, pieces: Vec<Piece<'_>>, values: &[Value]) -> Result<String> {
    let expected = pieces
        .iter()
        .filter(|p| matches!(p, Piece::Positional))
        .count();
    if expected != values.len() {
        return Err(WhereError::BindCount {
            expected,
            actual: values.len(),
            sql: template.to_owned(),
        });
    }

    let mut values = values.iter();
    let mut out = String::with_capacity(template.len());
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Positional => {
                if let Some(value) = values.next() {
                    out.push_str(&bind_literal(value, template)?);
                }
            }
            Piece::Named(name) => {
                out.push(':');
                out.push_str(name);
            }
        }
    }
    Ok(out)
}

/// Replace each `:name` in `template` with its value from `values`.
/// Unused entries in `values` are ignored.
///
/// # Errors
///
/// Returns [`WhereError::MissingBind`] for a placeholder with no value, or
/// [`WhereError::UnrepresentableBind`] for a value [`quote_value`] cannot
/// render.
pub fn bind_named(template: &str, values: &BTreeMap<String, Value>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for piece in scan(template, Style::Bind) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Positional => out.push('?'),
            Piece::Named(name) => {
                let Some(value) = values.get(name) else {
                    return Err(WhereError::MissingBind {
                        name: name.to_owned(),
                        sql: template.to_owned(),
                    });
                };
                out.push_str(&bind_literal(value, template)?);
            }
        }
    }
    Ok(out)
}
