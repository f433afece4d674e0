//! Log sanitization utilities
//!
//! Backend responses can carry customer data and SOAP login responses carry
//! session ids, so nothing from the wire is logged verbatim.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters kept visible by [`mask_secret`].
const MASK_VISIBLE_PREFIX: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Bodies within the limit are returned unchanged; longer ones keep the first
/// `TRUNCATE_LIMIT` bytes (on a char boundary) plus the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a token or session id, keeping a short prefix for correlation.
///
/// `"00D5g000004abcd!AQ..."` becomes `"00D5****"`.
pub fn mask_secret(s: &str) -> String {
    let visible = s
        .char_indices()
        .nth(MASK_VISIBLE_PREFIX)
        .map_or(s.len(), |(i, _)| i);
    if visible >= s.len() {
        "****".to_string()
    } else {
        format!("{}****", &s[..visible])
    }
}
