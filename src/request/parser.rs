//! Query string and URL-encoded form parsing.

use std::borrow::Cow;

use crate::types::ParameterMap;

/// Decode a form-encoded component: `+` becomes a space, then percent escapes.
///
/// Malformed escapes (`%zz`, a trailing `%`) are kept literally and invalid
/// UTF-8 is replaced with U+FFFD, so decoding never fails.
#[inline]
pub fn form_decode(s: &str) -> Cow<'_, str> {
    if !s.contains(['%', '+']) {
        return Cow::Borrowed(s);
    }

    let spaced = s.replace('+', " ");
    Cow::Owned(
        percent_encoding::percent_decode_str(&spaced)
            .decode_utf8_lossy()
            .into_owned(),
    )
}

/// Parse a query string into an ordered multi-valued map.
///
/// Empty segments (`a=1&&b=2`) are skipped. A segment without `=` is a key
/// with an empty value, and blank values are kept. Repeated keys accumulate.
pub fn parse_query_string(query: &str) -> ParameterMap {
    let mut params = ParameterMap::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        params.push(form_decode(key).into_owned(), form_decode(value).into_owned());
    }

    params
}
