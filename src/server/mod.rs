//! Server module
//!
//! Binds the listener, accepts connections and runs every request through
//! the JSX middleware until shutdown.

pub mod connection;
pub mod listener;

pub use connection::handle_request;
pub use listener::create_reusable_listener;

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::environment::{environment_factory, JsxEnvironment, TransformerEnvironment};
use crate::error::Error;
use crate::handler::{next_fn, JsxFileMiddleware, Next};
use crate::http;
use crate::jsx::CommandTransformer;
use crate::logger;

/// Shared state of a running server
pub struct App {
    pub middleware: JsxFileMiddleware,
    pub access_log: bool,
    pub access_log_format: String,
}

impl App {
    /// Middleware over the configured directory with a fresh
    /// `CommandTransformer` per request
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let transformer = CommandTransformer::new(
            config.transformer.command.clone(),
            config.transformer.args.clone(),
        );

        let middleware = JsxFileMiddleware::builder()
            .next(fallback_next())
            .options(config.jsx_file_options())
            .environment(environment_factory(move || {
                Ok(Box::new(TransformerEnvironment::new(Arc::new(transformer.clone())))
                    as Box<dyn JsxEnvironment>)
            }))
            .build()?;

        Ok(Self {
            middleware,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        })
    }
}

/// End of the pipeline: anything not served is a 404
pub fn fallback_next() -> Next {
    next_fn(|_ctx| async { Ok(http::build_404_response()) })
}

/// Accept connections until Ctrl-C
pub async fn run(listener: TcpListener, app: Arc<App>) -> std::io::Result<()> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    connection::spawn_connection(stream, peer_addr, Arc::clone(&app));
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            result = &mut shutdown => {
                result?;
                logger::log_info("Shutdown signal received, stopping");
                return Ok(());
            }
        }
    }
}
