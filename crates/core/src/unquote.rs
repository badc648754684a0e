//! Strip one level of quoting from a cell value.
//!
//! Useful when the measurement lives in a JSON column and the driver hands
//! back `"42"` rather than `42`.

use crate::error::ExtractionError;

/// Remove exactly one level of quoting from `text`.
///
/// Accepted forms:
/// - `"..."` with backslash escapes, decoded as a JSON string literal;
/// - `` `...` `` raw literal, no escapes and no inner back-quote;
/// - `'c'` holding exactly one character.
///
/// Anything else is [`ExtractionError::UnquoteFailed`].
pub fn unquote(text: &str) -> Result<String, ExtractionError> {
    let failed = || ExtractionError::UnquoteFailed(text.to_string());

    let quote = match text.chars().next() {
        Some(c @ ('"' | '`' | '\'')) => c,
        _ => return Err(failed()),
    };
    if text.len() < 2 || !text.ends_with(quote) {
        return Err(failed());
    }
    // Quotes are single-byte, so these slice bounds are char boundaries.
    let inner = &text[1..text.len() - 1];

    match quote {
        '"' => serde_json::from_str::<String>(text).map_err(|_| failed()),
        '`' if !inner.contains('`') => Ok(inner.to_string()),
        '\'' => {
            let mut chars = inner.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c != '\'' && c != '\\' => Ok(c.to_string()),
                _ => Err(failed()),
            }
        }
        _ => Err(failed()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn double_quoted() {
        assert_eq!(unquote("\"3\"").unwrap(), "3");
        assert_eq!(unquote("\"12.5\"").unwrap(), "12.5");
        assert_eq!(unquote("\"\"").unwrap(), "");
    }

    #[test]
    fn double_quoted_escapes() {
        assert_eq!(unquote(r#""a\"b""#).unwrap(), "a\"b");
        assert_eq!(unquote(r#""42""#).unwrap(), "42");
        assert_eq!(unquote(r#""tab\there""#).unwrap(), "tab\there");
    }

    #[test]
    fn back_quoted_is_raw() {
        assert_eq!(unquote("`4`").unwrap(), "4");
        assert_eq!(unquote(r"`a\nb`").unwrap(), r"a\nb");
    }

    #[test]
    fn single_quoted_char() {
        assert_eq!(unquote("'5'").unwrap(), "5");
        assert_matches!(unquote("'55'"), Err(ExtractionError::UnquoteFailed(_)));
        assert_matches!(unquote("''"), Err(ExtractionError::UnquoteFailed(_)));
    }

    #[test]
    fn rejects_unquoted_and_unbalanced() {
        for text in ["", "3", "\"", "\"3", "3\"", "`3\"", "\"3\"\"", "`a`b`"] {
            assert_matches!(
                unquote(text),
                Err(ExtractionError::UnquoteFailed(t)) if t == text,
                "{text:?} should not unquote"
            );
        }
    }

    #[test]
    fn rejects_bad_escape() {
        assert_matches!(unquote(r#""\q""#), Err(ExtractionError::UnquoteFailed(_)));
    }
}
