//! HTML rendering of a [`Report`].

use std::fmt::Write;

use super::{BodySection, QuerySection, Report, Row};

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CGI Environment Dump</title>
    <style>
        body { font-family: monospace; margin: 20px; background: #1a1a2e; color: #eee; }
        h1 { color: #00d9ff; }
        h2 { color: #ff6b6b; margin-top: 30px; }
        table { border-collapse: collapse; width: 100%; margin: 10px 0; }
        th, td { border: 1px solid #444; padding: 8px; text-align: left; }
        th { background: #16213e; color: #00d9ff; }
        td { background: #0f3460; }
        .key { color: #ffd93d; font-weight: bold; }
        .success { color: #6bcb77; }
        .warning { color: #ffd93d; }
        .error { color: #ff6b6b; }
        .method { color: #00d9ff; font-weight: bold; }
        .form-section { background: #16213e; padding: 20px; margin: 20px 0; border-radius: 5px; }
        input[type="text"], textarea {
            background: #0f3460; color: #eee; border: 1px solid #444;
            padding: 8px; margin: 5px 0; width: 300px;
        }
        button {
            background: #00d9ff; color: #1a1a2e; border: none;
            padding: 10px 20px; cursor: pointer; font-weight: bold;
        }
        button:hover { background: #00b8d4; }
        .raw-data {
            background: #0f3460; padding: 10px; border: 1px solid #444;
            white-space: pre-wrap; word-wrap: break-word; max-height: 300px; overflow-y: auto;
        }
    </style>
</head>
<body>
    <h1>🚀 CGI Environment Dump</h1>
    <p class="success">✅ CGI is working!</p>
"#;

const HTML_FOOTER: &str = r#"    <div class="form-section">
        <h2>🧪 Test Forms</h2>

        <h3>GET Request Test</h3>
        <form method="GET">
            <input type="text" name="name" placeholder="Your name" value="Alice">
            <input type="text" name="age" placeholder="Your age" value="30">
            <button type="submit">Send GET Request</button>
        </form>

        <h3>POST Request Test</h3>
        <form method="POST">
            <input type="text" name="username" placeholder="Username" value="testuser"><br>
            <input type="text" name="email" placeholder="Email" value="test@example.com"><br>
            <textarea name="message" placeholder="Your message" rows="3">Hello from POST!</textarea><br>
            <button type="submit">Send POST Request</button>
        </form>
    </div>
</body>
</html>
"#;

const TABLE_KV_HEADER: &str = "    <table>\n        <tr><th>Key</th><th>Value</th></tr>\n";
const TABLE_VAR_HEADER: &str = "    <table>\n        <tr><th>Variable</th><th>Value</th></tr>\n";
const TABLE_END: &str = "    </table>\n";

fn push_rows(out: &mut String, rows: &[Row]) {
    for row in rows {
        let _ = writeln!(
            out,
            "        <tr><td class='key'>{}</td><td>{}</td></tr>",
            row.key, row.value
        );
    }
}

fn push_message_row(out: &mut String, message: &str) {
    let _ = writeln!(
        out,
        "        <tr><td colspan='2'><em>{}</em></td></tr>",
        message
    );
}

fn render_cgi_vars(out: &mut String, report: &Report) {
    out.push_str("    <h2>📋 CGI Environment Variables</h2>\n");
    out.push_str(TABLE_VAR_HEADER);
    push_rows(out, &report.cgi_vars);
    out.push_str(TABLE_END);
}

fn render_query(out: &mut String, report: &Report) {
    out.push_str("    <h2>🔍 Query Parameters (GET)</h2>\n");
    out.push_str(TABLE_KV_HEADER);
    match &report.query {
        QuerySection::NoParameters => push_message_row(out, "No query parameters"),
        QuerySection::Params(rows) => push_rows(out, rows),
    }
    out.push_str(TABLE_END);
}

fn render_body(out: &mut String, report: &Report) {
    out.push_str("    <h2>📮 POST Data</h2>\n");

    if report.body == BodySection::NotPost {
        out.push_str("    <p class='warning'>⚠️ Not a POST request</p>\n");
        return;
    }

    out.push_str(TABLE_KV_HEADER);
    match &report.body {
        BodySection::NotPost | BodySection::NoData => push_message_row(out, "No POST data"),
        BodySection::Fields(rows) => push_rows(out, rows),
        BodySection::Error(message) => {
            let _ = writeln!(
                out,
                "        <tr><td colspan='2' class='error'>Error parsing: {}</td></tr>",
                message
            );
        }
    }
    out.push_str(TABLE_END);

    if let Some(preview) = &report.raw_preview {
        out.push_str("    <h3>Raw POST Data</h3>\n");
        out.push_str("    <div class='raw-data'>\n");
        let _ = writeln!(out, "    {}", preview.text);
        if let Some(total) = preview.truncated_from {
            let _ = writeln!(out, "    ... (truncated, {} bytes total)", total);
        }
        out.push_str("    </div>\n");
    }
}

fn render_environment(out: &mut String, report: &Report) {
    out.push_str("    <h2>🔧 All Environment Variables</h2>\n");
    out.push_str(TABLE_VAR_HEADER);
    push_rows(out, &report.environment);
    out.push_str(TABLE_END);
}

fn render_runtime(out: &mut String, report: &Report) {
    out.push_str("    <h2>ℹ️ Runtime Info</h2>\n");
    for line in &report.runtime {
        let _ = writeln!(out, "    <p>{}: {}</p>", line.label, line.value);
    }
}

/// Render the full HTML page for a report.
pub fn render_html(report: &Report) -> String {
    let mut out = String::with_capacity(
        HTML_HEAD.len() + HTML_FOOTER.len() + 128 * (report.environment.len() + 32),
    );

    out.push_str(HTML_HEAD);
    let _ = writeln!(
        out,
        "    <p class=\"method\">Request Method: {}</p>",
        report.method
    );
    render_cgi_vars(&mut out, report);
    render_query(&mut out, report);
    render_body(&mut out, report);
    render_environment(&mut out, report);
    render_runtime(&mut out, report);
    out.push_str(HTML_FOOTER);

    out
}
