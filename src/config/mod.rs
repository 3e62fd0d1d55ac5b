// Configuration module entry point
// Loads config.toml overlaid by JSXSERVE__* environment variables

mod types;

use std::net::SocketAddr;
use std::sync::Arc;

pub use types::{
    Config, JsxConfig, LoggingConfig, ServerConfig, StaticFilesConfig, TransformerConfig,
};

use crate::fs::PhysicalFileSystem;
use crate::handler::{JsxFileOptions, StaticFileOptions};
use crate::http::cache::CachePolicy;

impl Config {
    /// Load configuration from a file path (extension optional)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, env_source())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("static_files.root", "public")?
            .set_default("static_files.request_path", "")?
            .set_default("static_files.serve_unknown_file_types", false)?
            .set_default("static_files.cache_max_age", 3600)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Middleware options for the configured directory
    pub fn jsx_file_options(&self) -> JsxFileOptions {
        let files = &self.static_files;
        JsxFileOptions {
            extensions: self.jsx.extensions.clone(),
            static_file_options: StaticFileOptions {
                default_content_type: files.default_content_type.clone(),
                request_path: files.request_path.clone(),
                serve_unknown_file_types: files.serve_unknown_file_types,
                cache_policy: CachePolicy::from_max_age(files.cache_max_age),
                file_system: Arc::new(PhysicalFileSystem::new(&files.root)),
                ..StaticFileOptions::default()
            },
        }
    }
}

/// `JSXSERVE__SECTION__KEY` overrides; list keys take comma-separated values
fn env_source() -> config::Environment {
    config::Environment::with_prefix("JSXSERVE")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("jsx.extensions")
        .with_list_parse_key("transformer.args")
}
