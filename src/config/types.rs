// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub jsx: JsxConfig,
    pub static_files: StaticFilesConfig,
    #[serde(default)]
    pub transformer: TransformerConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Which files are transpiled
#[derive(Debug, Deserialize, Clone)]
pub struct JsxConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![".jsx".to_string()]
}

impl Default for JsxConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    /// Directory files are served from
    pub root: String,
    /// URL prefix the directory is mounted under
    pub request_path: String,
    #[serde(default)]
    pub default_content_type: Option<String>,
    pub serve_unknown_file_types: bool,
    /// Cache-Control max-age in seconds, 0 for `no-cache`
    pub cache_max_age: u32,
}

/// External transpiler invocation
///
/// `{path}` in `args` is replaced by the request path.
#[derive(Debug, Deserialize, Clone)]
pub struct TransformerConfig {
    #[serde(default = "default_transformer_command")]
    pub command: String,
    #[serde(default = "default_transformer_args")]
    pub args: Vec<String>,
}

fn default_transformer_command() -> String {
    "esbuild".to_string()
}

fn default_transformer_args() -> Vec<String> {
    vec!["--loader=jsx".to_string(), "--sourcefile={path}".to_string()]
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            command: default_transformer_command(),
            args: default_transformer_args(),
        }
    }
}
