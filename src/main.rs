use std::sync::Arc;

use jsxserve::config::Config;
use jsxserve::logger;
use jsxserve::server::{self, App};

const DEFAULT_CONFIG: &str = "config.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker count comes from config, defaulting to one per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let app = Arc::new(App::from_config(&cfg)?);

    logger::log_server_start(&addr, &cfg);
    server::run(listener, app).await?;
    Ok(())
}
