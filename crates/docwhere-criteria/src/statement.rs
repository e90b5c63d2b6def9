//! Locating the WHERE clause inside a complete statement.

const WHERE: &str = "where";

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// The text after the last `WHERE` keyword of `sql`, trimmed.
///
/// The keyword is matched case-insensitively on word boundaries, so a column
/// named `somewhere` does not count. Returns `""` when there is no `WHERE`.
#[must_use]
pub fn where_fragment(sql: &str) -> &str {
    // ASCII lowercasing keeps byte offsets, so positions in `lower` index `sql`.
    let lower = sql.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut after = None;
    for (at, _) in lower.match_indices(WHERE) {
        let end = at + WHERE.len();
        let bounded_before = at == 0 || !is_word_byte(bytes[at - 1]);
        let bounded_after = end == bytes.len() || !is_word_byte(bytes[end]);
        if bounded_before && bounded_after {
            after = Some(end);
        }
    }
    after.map_or("", |end| sql[end..].trim())
}
