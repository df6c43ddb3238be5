use std::sync::Arc;
use tokio::sync::watch;

mod admin;
mod config;
mod error;
mod handler;
mod http;
mod install;
mod logger;
mod routing;
mod server;
mod settings;
mod storage;

#[cfg(test)]
mod scenario_tests;

use server::ServerKind;
use settings::TomlSettingsStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker thread count follows `server.workers`, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let public_addr = cfg.get_socket_addr()?;
    let admin_addr = cfg.get_admin_socket_addr()?;

    let store = Arc::new(TomlSettingsStore::open(&cfg.storage.state_file));
    logger::log_info(&format!("Settings file: {}", store.state_path().display()));
    install::run(&cfg, store.as_ref())?;

    let state = Arc::new(config::AppState::new(cfg.clone(), store));
    state.flush_routes();

    let public_listener = server::create_reusable_listener(public_addr)?;
    let admin_listener = server::create_reusable_listener(admin_addr)?;
    logger::log_server_start(&public_addr, &admin_addr, &cfg);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            tokio::task::spawn_local(server::signal::wait_for_shutdown(shutdown_tx));

            let admin = tokio::task::spawn_local(server::start_server_loop(
                admin_listener,
                Arc::clone(&state),
                ServerKind::Admin,
                shutdown_rx.clone(),
            ));
            server::start_server_loop(public_listener, state, ServerKind::Public, shutdown_rx)
                .await;

            if let Err(e) = admin.await {
                logger::log_error(&format!("Admin server task failed: {e}"));
            }
        })
        .await;

    logger::log_info("Shutdown complete");
    Ok(())
}
