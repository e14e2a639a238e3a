//! Request body decoding with a bounded, length-driven read.

use std::num::IntErrorKind;

use bytes::Bytes;
use http::Method;

use super::multipart::parse_multipart;
use super::parser::parse_query_string;
use crate::types::{BodyResult, FieldMap, FormField};

/// Default hard cap on body bytes considered (32 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u64 = 32 * 1024 * 1024;

/// Raw bodies at or above this many bytes get no preview.
pub const PREVIEW_MAX_BODY: usize = 10_000;

/// Maximum number of bytes shown in the preview.
pub const PREVIEW_LIMIT: usize = 1_000;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Limits applied while reading and decoding a body.
#[derive(Clone, Copy, Debug)]
pub struct BodyLimits {
    /// Hard cap on bytes read, whatever the declared length says.
    pub max_body_size: u64,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Parse a declared `Content-Length`.
///
/// Returns `None` for missing, non-numeric, negative or zero lengths; those
/// requests are treated as having no body. A positive length is capped at
/// `max`.
pub fn parse_declared_length(declared: Option<&str>, max: u64) -> Option<u64> {
    let declared = declared?.trim();
    match declared.parse::<i64>() {
        Ok(len) if len > 0 => {
            let len = len as u64;
            if len > max {
                tracing::warn!(
                    declared = len,
                    max_body_size = max,
                    "declared body length exceeds limit, capping"
                );
            }
            Some(len.min(max))
        }
        Ok(_) => None,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            tracing::warn!(
                declared = declared,
                max_body_size = max,
                "declared body length overflows, capping"
            );
            Some(max)
        }
        Err(_) => {
            tracing::debug!(declared = declared, "ignoring invalid body length");
            None
        }
    }
}

/// Whether the method carries a form body.
#[inline]
pub fn is_body_method(method: &str) -> bool {
    method == Method::POST.as_str()
}

/// Decoded body together with the raw text it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDecode {
    /// Parsed body.
    pub result: BodyResult,
    /// Bytes actually considered, decoded as lossy UTF-8.
    pub raw_text: String,
}

impl BodyDecode {
    fn without_body(result: BodyResult) -> Self {
        Self {
            result,
            raw_text: String::new(),
        }
    }
}

/// Decode a request body.
///
/// Only the first `declared_length` bytes of `body` are looked at (after the
/// hard cap), and a shorter body is decoded as-is. Decode failures come back
/// as [`BodyResult::DecodeError`], never as a panic or an error.
pub async fn decode_body(
    method: &str,
    content_type: Option<&str>,
    declared_length: Option<&str>,
    body: &[u8],
    limits: BodyLimits,
) -> BodyDecode {
    if !is_body_method(method) {
        return BodyDecode::without_body(BodyResult::NotApplicable);
    }

    let Some(length) = parse_declared_length(declared_length, limits.max_body_size) else {
        return BodyDecode::without_body(BodyResult::Empty);
    };

    let available = body.len() as u64;
    if available < length {
        tracing::debug!(
            declared = length,
            available = available,
            "body shorter than declared length, decoding partial data"
        );
    }
    let data = &body[..length.min(available) as usize];
    let raw_text = String::from_utf8_lossy(data).into_owned();

    let content_type = content_type.map(str::trim).unwrap_or("");
    let content_type_lower = content_type.to_ascii_lowercase();

    let result = if content_type.is_empty() || content_type_lower.starts_with(FORM_URLENCODED) {
        BodyResult::Fields(parse_query_string(&raw_text).map_values(FormField::Value))
    } else if content_type_lower.starts_with(MULTIPART_FORM_DATA) {
        match parse_multipart(content_type, Bytes::copy_from_slice(data)).await {
            Ok(fields) => BodyResult::Fields(fields),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse multipart body");
                BodyResult::DecodeError(e)
            }
        }
    } else {
        // JSON, XML, etc. carry no form fields; the raw preview still shows them
        BodyResult::Fields(FieldMap::new())
    };

    BodyDecode { result, raw_text }
}

/// Preview of the raw body for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPreview {
    /// At most [`PREVIEW_LIMIT`] bytes of the body text.
    pub text: String,
    /// Total byte length when the text was cut.
    pub truncated_from: Option<usize>,
}

impl RawPreview {
    /// Build a preview, or `None` when the text is empty or too large.
    pub fn from_text(raw_text: &str) -> Option<Self> {
        if raw_text.is_empty() || raw_text.len() >= PREVIEW_MAX_BODY {
            return None;
        }

        if raw_text.len() <= PREVIEW_LIMIT {
            return Some(Self {
                text: raw_text.to_string(),
                truncated_from: None,
            });
        }

        let cut = floor_char_boundary(raw_text, PREVIEW_LIMIT);
        Some(Self {
            text: raw_text[..cut].to_string(),
            truncated_from: Some(raw_text.len()),
        })
    }
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
