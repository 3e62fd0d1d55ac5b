//! Logger module
//!
//! Logging utilities for the server and the middleware:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled debug/info/warning/error lines with timestamps
//!
//! Before `init()` runs everything goes to stdout/stderr at `info` level.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use chrono::Local;
use std::net::SocketAddr;

/// Initialize the logger with configuration
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, falling back to info");
        Level::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level >= Level::Info, |w| w.enabled(level))
}

fn stamp(message: &str) -> String {
    format!("{} {message}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("jsxserve started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving: {}", config.static_files.root));
    write_info(&format!(
        "JSX extensions: {} via '{}'",
        config.jsx.extensions.join(", "),
        config.transformer.command
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&stamp(&format!("[DEBUG] {message}")));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&stamp(&format!("[INFO] {message}")));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&stamp(&format!("[WARN] {message}")));
    }
}

pub fn log_error(message: &str) {
    write_error(&stamp(&format!("[ERROR] {message}")));
}

pub fn log_response(path: &str, status: u16, size: usize) {
    log_debug(&format!("[Response] {path} -> {status} ({size} bytes)"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
