//! Multipart form data parsing.

use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;

use crate::types::{FieldMap, FormField};

/// Extract the `boundary` parameter from a multipart content type.
///
/// The parameter name is matched case-insensitively and surrounding quotes
/// are stripped.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let trimmed = part.trim();
        let (name, value) = trimmed.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("boundary") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// Parse multipart form data into form fields.
///
/// A part with a `filename` attribute becomes [`FormField::UploadedFile`]
/// without its content being read; any other part becomes
/// [`FormField::Value`] with its body decoded as lossy UTF-8.
pub async fn parse_multipart(content_type: &str, body: Bytes) -> Result<FieldMap, String> {
    tracing::debug!(
        content_type = content_type,
        body_len = body.len(),
        "parse_multipart: starting"
    );

    let boundary =
        extract_boundary(content_type).ok_or("Missing boundary in multipart content-type")?;

    tracing::debug!(boundary = %boundary, "parse_multipart: found boundary");

    let mut multipart = Multipart::new(
        stream::once(async { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut fields = FieldMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let field_name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_string();
            tracing::debug!(
                field_name = %field_name,
                file_name = %file_name,
                "parse_multipart: file part"
            );
            // Dropping the field lets multer skip over its content
            fields.push(field_name, FormField::UploadedFile(file_name));
        } else {
            let data = field.bytes().await.map_err(|e| e.to_string())?;
            let value = String::from_utf8_lossy(&data).into_owned();
            tracing::debug!(
                field_name = %field_name,
                value_len = value.len(),
                "parse_multipart: form field"
            );
            fields.push(field_name, FormField::Value(value));
        }
    }

    tracing::debug!(fields_count = fields.len(), "parse_multipart: completed");

    Ok(fields)
}
