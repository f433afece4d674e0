//! SOQL 构造
//!
//! User input only ever lands inside a single-quoted string literal, so
//! escaping the literal is sufficient to keep it from altering the query.

use super::LEAD_FIELDS;

/// Escape a term for use inside a `LIKE '...'` literal.
///
/// Quotes and backslashes are escaped per SOQL string rules; `%` and `_`
/// are escaped so the term matches literally.
pub(crate) fn escape_like_literal(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            _ => out.push(c),
        }
    }
    out
}

/// `SELECT ... FROM Lead WHERE Name LIKE '%term%' LIMIT n`
pub(crate) fn lead_search_query(term: &str, limit: u32) -> String {
    format!(
        "SELECT {} FROM Lead WHERE Name LIKE '%{}%' LIMIT {limit}",
        LEAD_FIELDS.join(", "),
        escape_like_literal(term.trim())
    )
}
