//! HTML escaping for untrusted values.

use std::borrow::Cow;

/// Rendered in place of an absent value.
///
/// Contains markup, so it can never collide with an escaped real value.
pub const NOT_SET: &str = "<em>(not set)</em>";

#[inline]
fn needs_escape(s: &str) -> bool {
    s.bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
}

/// Escape a string for embedding in HTML text or a quoted attribute.
///
/// Borrows the input when nothing needs replacing.
pub fn escape_str(s: &str) -> Cow<'_, str> {
    if !needs_escape(s) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an optional value; `None` renders as [`NOT_SET`].
#[inline]
pub fn escape(value: Option<&str>) -> Cow<'_, str> {
    match value {
        Some(s) => escape_str(s),
        None => Cow::Borrowed(NOT_SET),
    }
}
