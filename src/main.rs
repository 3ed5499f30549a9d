use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod resolver;
mod server;
mod store;
mod tags;

/// Config file used when no path is given on the command line (extension optional)
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = store::CatalogStore::load(&cfg.storage.catalog)?;
    let module_count = store.len();
    if store.is_empty() {
        logger::log_warning(&format!(
            "Module catalog {} is empty; every asset request will return 404",
            cfg.storage.catalog
        ));
    }
    logger::log_info(&format!(
        "Loaded {module_count} modules ({} releases) from {}",
        store.release_count(),
        cfg.storage.catalog
    ));

    let tags = tags::TagCache::load(&cfg.tags.file, cfg.tag_refresh_interval())
        .await
        .map_err(|e| format!("Failed to read tags file '{}': {e}", cfg.tags.file))?;

    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg, Arc::new(store), tags));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals), Arc::clone(&state))?;

    logger::log_server_start(&addr, &cfg, module_count);

    server::start_server_loop(
        listener,
        state,
        Arc::clone(&active_connections),
        Arc::clone(&signals.shutdown),
    )
    .await?;

    if signals.shutdown_requested.load(Ordering::SeqCst) {
        logger::log_info(&format!(
            "Stopped; {} connection(s) still finishing",
            active_connections.load(Ordering::SeqCst)
        ));
    }

    Ok(())
}
