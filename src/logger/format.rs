//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - any other string is a pattern with `$variables`

use chrono::{DateTime, Local};
use serde_json::json;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// `1.0`, `1.1` or `2`
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Entry stamped with the current time, status 200 and no body
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            pattern => self.format_pattern(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    fn request_time_secs(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let secs = self.request_time_us as f64 / 1_000_000.0;
        format!("{secs:.3}")
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Substitute `$variables`; longer names are replaced before their
    /// prefixes (`$request_time` before `$request`)
    /// Expand `$variable`s in a single pass, so values are never rescanned
    fn format_pattern(&self, pattern: &str) -> String {
        let mut line = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            line.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            let name_len = tail[1..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .map_or(tail.len(), |n| n + 1);
            let name = &tail[..name_len];
            match self.variable(name) {
                Some(value) => line.push_str(&value),
                None => line.push_str(name),
            }
            rest = &tail[name_len..];
        }

        line.push_str(rest);
        line
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "$remote_addr" => self.remote_addr.clone(),
            "$time_local" => self.time.format(CLF_TIME).to_string(),
            "$time_iso8601" => self.time.to_rfc3339(),
            "$request_time" => self.request_time_secs(),
            "$request_method" => self.method.clone(),
            "$request_uri" => self.request_uri(),
            "$request" => self.request_line(),
            "$status" => self.status.to_string(),
            "$body_bytes_sent" => self.body_bytes.to_string(),
            "$http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "$http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            _ => return None,
        };
        Some(value)
    }
}
