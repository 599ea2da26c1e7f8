//! Escaping of the characters reserved by the parentheses notation.
//!
//! The notation reserves `(`, `)`, `,` and the escape character `\` itself. Inside a
//! literal each of them is prefixed with `\`. A backslash that is not followed by a
//! reserved character is kept as is when unescaping, so hand-written input such as
//! `C:\tmp` survives a parse unchanged.

use std::borrow::Cow;

/// Character prefixed to reserved characters inside a literal.
pub const ESCAPE_CHAR: char = '\\';

/// Every character with a meaning in the parentheses notation.
pub const RESERVED_CHARS: &str = "(),\\";

/// Whether `c` must be escaped inside a literal.
#[inline]
pub fn is_reserved(c: char) -> bool {
    RESERVED_CHARS.contains(c)
}

/// Escapes every reserved character of `value`. Borrows when nothing needs escaping.
///
/// ```
/// use hytree::escape::{escape, unescape};
///
/// assert_eq!(escape("a(b,c)"), r"a\(b\,c\)");
/// assert_eq!(unescape(&escape(r"x\y")), r"x\y");
/// ```
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(is_reserved) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if is_reserved(c) {
            out.push(ESCAPE_CHAR);
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Removes the escape character in front of reserved characters.
pub fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains(ESCAPE_CHAR) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            if let Some(&next) = chars.peek() {
                if is_reserved(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrows_plain_values() {
        assert!(matches!(escape("plain value"), Cow::Borrowed(_)));
        assert!(matches!(unescape("plain value"), Cow::Borrowed(_)));
    }

    #[test]
    fn keeps_dangling_escape() {
        assert_eq!(unescape(r"a\b"), r"a\b");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn escapes_all_reserved() {
        assert_eq!(escape(r"(),\"), r"\(\)\,\\");
        assert_eq!(unescape(r"\(\)\,\\"), r"(),\");
    }
}
