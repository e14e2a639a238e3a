//! Unified JSON logging with custom format.
//!
//! Log format:
//! ```json
//! {"ts":"2024-12-28T15:04:05.123Z","level":"info","type":"app","msg":"Server started","ctx":{},"data":{}}
//! ```
//!
//! All log output goes to stderr: in CGI mode stdout carries the response.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

// ============================================================================
// Subscriber setup
// ============================================================================

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("env_dump=info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormatter::new(&config.service_name))
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

// ============================================================================
// ISO 8601 timestamp formatting (zero heap allocation)
// ============================================================================

/// ISO 8601 timestamp buffer - exactly 24 bytes: "2024-01-15T10:30:00.123Z"
#[derive(Clone, Copy)]
pub struct Iso8601Timestamp {
    buf: [u8; 24],
}

impl Iso8601Timestamp {
    /// Create a new timestamp for the current time.
    #[inline]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_duration(now)
    }

    /// Create from a Duration since UNIX_EPOCH.
    pub fn from_duration(duration: Duration) -> Self {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();

        let day_secs = secs % 86400;
        let hours = (day_secs / 3600) as u8;
        let minutes = ((day_secs % 3600) / 60) as u8;
        let seconds = (day_secs % 60) as u8;

        let mut year = 1970u16;
        let mut remaining = (secs / 86400) as i64;

        loop {
            let year_days = if is_leap_year(year) { 366 } else { 365 };
            if remaining < year_days {
                break;
            }
            remaining -= year_days;
            year += 1;
        }

        let month_days: [u8; 12] = if is_leap_year(year) {
            [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        } else {
            [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        };

        let mut month = 1u8;
        for &days_in_month in &month_days {
            if remaining < days_in_month as i64 {
                break;
            }
            remaining -= days_in_month as i64;
            month += 1;
        }
        let day = (remaining + 1) as u8;

        let mut buf = [0u8; 24];
        write_padded(&mut buf[0..4], year as u32);
        buf[4] = b'-';
        write_padded(&mut buf[5..7], month as u32);
        buf[7] = b'-';
        write_padded(&mut buf[8..10], day as u32);
        buf[10] = b'T';
        write_padded(&mut buf[11..13], hours as u32);
        buf[13] = b':';
        write_padded(&mut buf[14..16], minutes as u32);
        buf[16] = b':';
        write_padded(&mut buf[17..19], seconds as u32);
        buf[19] = b'.';
        write_padded(&mut buf[20..23], millis);
        buf[23] = b'Z';

        Self { buf }
    }

    /// Get the timestamp as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ASCII digits and punctuation are ever written
        std::str::from_utf8(&self.buf).unwrap_or("1970-01-01T00:00:00.000Z")
    }
}

impl std::fmt::Display for Iso8601Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Iso8601Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0) && (year % 100 != 0 || year % 400 == 0)
}

/// Write `val` as zero-padded decimal filling the whole buffer.
#[inline]
fn write_padded(buf: &mut [u8], mut val: u32) {
    for slot in buf.iter_mut().rev() {
        *slot = b'0' + (val % 10) as u8;
        val /= 10;
    }
}

// ============================================================================
// JSON event formatter
// ============================================================================

/// Custom JSON formatter for tracing.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = match *meta.level() {
            Level::TRACE => "debug",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };

        let log_type = if *meta.level() == Level::ERROR {
            "error"
        } else {
            "app"
        };

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let entry = serde_json::json!({
            "ts": Iso8601Timestamp::now().as_str(),
            "level": level,
            "type": log_type,
            "msg": visitor.message.unwrap_or_default(),
            "ctx": { "service": &self.service_name },
            "data": visitor.fields,
        });

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&entry).unwrap_or_default()
        )
    }
}

/// Field visitor for collecting tracing fields.
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: HashMap::new(),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value).trim_matches('"').to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }
}

// ============================================================================
// Access log
// ============================================================================

/// One served request, as written to the access log.
pub struct AccessEntry<'a> {
    pub request_id: &'a str,
    pub ip: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub http: &'a str,
    pub status: u16,
    pub bytes: u64,
    pub duration_ms: f64,
    pub ua: Option<&'a str>,
}

impl AccessEntry<'_> {
    /// Build the JSON line for this entry.
    pub fn to_json(&self, ts: &str, service: &str) -> serde_json::Value {
        let mut data = serde_json::Map::new();
        data.insert("method".into(), serde_json::json!(self.method));
        data.insert("path".into(), serde_json::json!(self.path));
        if let Some(q) = self.query {
            data.insert("query".into(), serde_json::json!(q));
        }
        data.insert("http".into(), serde_json::json!(self.http));
        data.insert("status".into(), serde_json::json!(self.status));
        data.insert("bytes".into(), serde_json::json!(self.bytes));
        data.insert("duration_ms".into(), serde_json::json!(self.duration_ms));
        data.insert("ip".into(), serde_json::json!(self.ip));
        if let Some(u) = self.ua {
            data.insert("ua".into(), serde_json::json!(u));
        }

        serde_json::json!({
            "ts": ts,
            "level": "info",
            "type": "access",
            "msg": format!("{} {} {}", self.method, self.path, self.status),
            "ctx": { "service": service, "request_id": self.request_id },
            "data": data,
        })
    }
}

/// Log an access request directly (bypassing tracing for simpler output).
pub fn log_access(entry: &AccessEntry<'_>, service: &str) {
    let line = entry.to_json(Iso8601Timestamp::now().as_str(), service);
    let _ = writeln!(io::stderr(), "{}", line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_epoch() {
        let ts = Iso8601Timestamp::from_duration(Duration::ZERO);
        assert_eq!(ts.as_str(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_timestamp_leap_day() {
        // 2024-02-29T12:34:56.789Z
        let ts = Iso8601Timestamp::from_duration(Duration::from_millis(1_709_210_096_789));
        assert_eq!(ts.to_string(), "2024-02-29T12:34:56.789Z");
    }

    #[test]
    fn test_access_entry_json() {
        let entry = AccessEntry {
            request_id: "abc",
            ip: "127.0.0.1",
            method: "POST",
            path: "/cgi-bin/env",
            query: Some("a=1"),
            http: "HTTP/1.1",
            status: 200,
            bytes: 512,
            duration_ms: 1.5,
            ua: None,
        };

        let json = entry.to_json("2024-01-01T00:00:00.000Z", "env_dump");
        assert_eq!(json["type"], "access");
        assert_eq!(json["msg"], "POST /cgi-bin/env 200");
        assert_eq!(json["ctx"]["request_id"], "abc");
        assert_eq!(json["data"]["query"], "a=1");
        assert_eq!(json["data"]["status"], 200);
        assert!(json["data"].get("ua").is_none());
    }
}
