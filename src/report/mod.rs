//! Report assembly: turns a [`RequestSnapshot`] into an escaped, sorted view.
//!
//! Every string stored in a [`Report`] has already gone through the escaper,
//! so renderers can embed them verbatim.

mod escape;
mod render;

pub use escape::{escape, escape_str, NOT_SET};
pub use render::render_html;

use crate::core::RequestSnapshot;
use crate::request::{decode_body, parse_query_string, BodyLimits, RawPreview};
use crate::types::{BodyResult, FormField};

/// CGI meta-variables listed at the top of the report, in display order.
pub const CGI_VARS: &[&str] = &[
    "GATEWAY_INTERFACE",
    "SERVER_PROTOCOL",
    "SERVER_SOFTWARE",
    "SERVER_NAME",
    "SERVER_PORT",
    "REQUEST_METHOD",
    "REQUEST_URI",
    "SCRIPT_NAME",
    "SCRIPT_FILENAME",
    "DOCUMENT_ROOT",
    "PATH_INFO",
    "QUERY_STRING",
    "CONTENT_TYPE",
    "CONTENT_LENGTH",
    "REMOTE_ADDR",
    "REMOTE_PORT",
    "REDIRECT_STATUS",
];

/// Separator between the values of a repeated key.
const VALUE_SEPARATOR: &str = ", ";

/// One escaped key/value row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub value: String,
}

impl Row {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Query parameter section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySection {
    /// The query string was empty.
    NoParameters,
    /// Rows sorted by key.
    Params(Vec<Row>),
}

/// Body section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySection {
    /// The request method carries no form body.
    NotPost,
    /// No body, or a body without fields.
    NoData,
    /// Rows sorted by key.
    Fields(Vec<Row>),
    /// Escaped decode error message.
    Error(String),
}

/// Escaped raw body preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSection {
    pub text: String,
    pub truncated_from: Option<usize>,
}

/// Labelled runtime information line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub label: &'static str,
    pub value: String,
}

/// Read-only, fully escaped view of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Escaped request method.
    pub method: String,
    /// Allow-listed CGI variables, in [`CGI_VARS`] order.
    pub cgi_vars: Vec<Row>,
    pub query: QuerySection,
    pub body: BodySection,
    pub raw_preview: Option<PreviewSection>,
    /// Full environment, sorted by key.
    pub environment: Vec<Row>,
    pub runtime: Vec<InfoLine>,
}

/// Build the report for a snapshot.
///
/// Performs no I/O: the body is decoded from the bytes held by the snapshot.
pub async fn assemble(snapshot: &RequestSnapshot, limits: BodyLimits) -> Report {
    let decoded = decode_body(
        snapshot.method(),
        snapshot.content_type(),
        snapshot.content_length(),
        snapshot.body(),
        limits,
    )
    .await;

    tracing::debug!(
        method = snapshot.method(),
        env_vars = snapshot.env().len(),
        raw_body_len = decoded.raw_text.len(),
        "assembling report"
    );

    Report {
        method: escape_str(snapshot.method()).into_owned(),
        cgi_vars: cgi_rows(snapshot),
        query: query_section(snapshot.query_string()),
        body: body_section(&decoded.result),
        raw_preview: RawPreview::from_text(&decoded.raw_text).map(|p| PreviewSection {
            text: escape_str(&p.text).into_owned(),
            truncated_from: p.truncated_from,
        }),
        environment: environment_rows(snapshot),
        runtime: runtime_lines(snapshot),
    }
}

fn cgi_rows(snapshot: &RequestSnapshot) -> Vec<Row> {
    CGI_VARS
        .iter()
        .map(|&name| Row::new(name, escape(snapshot.env_var(name))))
        .collect()
}

fn query_section(query: &str) -> QuerySection {
    if query.is_empty() {
        return QuerySection::NoParameters;
    }

    let params = parse_query_string(query);
    QuerySection::Params(
        params
            .sorted()
            .into_iter()
            .map(|(key, values)| {
                Row::new(
                    escape_str(key),
                    escape_str(&values.join(VALUE_SEPARATOR)),
                )
            })
            .collect(),
    )
}

fn render_field(field: &FormField) -> String {
    match field {
        FormField::UploadedFile(name) => format!("📁 File: {}", escape_str(name)),
        FormField::Value(text) => escape_str(text).into_owned(),
    }
}

fn body_section(result: &BodyResult) -> BodySection {
    match result {
        BodyResult::NotApplicable => BodySection::NotPost,
        BodyResult::Empty => BodySection::NoData,
        BodyResult::Fields(fields) if fields.is_empty() => BodySection::NoData,
        BodyResult::Fields(fields) => BodySection::Fields(
            fields
                .sorted()
                .into_iter()
                .map(|(key, values)| {
                    let rendered: Vec<String> = values.iter().map(render_field).collect();
                    Row::new(escape_str(key), rendered.join(VALUE_SEPARATOR))
                })
                .collect(),
        ),
        BodyResult::DecodeError(message) => BodySection::Error(escape_str(message).into_owned()),
    }
}

fn environment_rows(snapshot: &RequestSnapshot) -> Vec<Row> {
    let mut vars: Vec<(&String, &String)> = snapshot.env().iter().collect();
    vars.sort_by(|a, b| a.0.cmp(b.0));
    vars.into_iter()
        .map(|(key, value)| Row::new(escape_str(key), escape_str(value)))
        .collect()
}

fn runtime_lines(snapshot: &RequestSnapshot) -> Vec<InfoLine> {
    let runtime = snapshot.runtime();
    vec![
        InfoLine {
            label: "Version",
            value: escape_str(&runtime.version).into_owned(),
        },
        InfoLine {
            label: "Platform",
            value: escape_str(&runtime.platform).into_owned(),
        },
        InfoLine {
            label: "Executable",
            value: escape_str(&runtime.executable).into_owned(),
        },
    ]
}
