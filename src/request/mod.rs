//! Request data decoding: query strings and form bodies.

mod body;
mod multipart;
mod parser;

pub use body::{
    decode_body, is_body_method, parse_declared_length, BodyDecode, BodyLimits, RawPreview,
    DEFAULT_MAX_BODY_SIZE, PREVIEW_LIMIT, PREVIEW_MAX_BODY,
};
pub use multipart::{extract_boundary, parse_multipart};
pub use parser::{form_decode, parse_query_string};
