//! OCPP 1.6J backend gateway binary: loads configuration, opens the store,
//! runs migrations, marks every station offline, then runs the station
//! WebSocket listener and the control-plane HTTP surface side by side until
//! a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use ocpp_gateway::config::AppConfig;
use ocpp_gateway::control::ControlService;
use ocpp_gateway::registry::StationRegistry;
use ocpp_gateway::server::http::router as control_router;
use ocpp_gateway::server::{listen_for_os_signals, run_ws_listener, ShutdownSignal, WsListenerConfig};
use ocpp_gateway::store::seaorm::SeaOrmStore;
use ocpp_gateway::store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("OCPP_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| AppConfig::default_config_path());

    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging.level);
            info!(path = %config_path.display(), "configuration loaded");
            cfg
        }
        Err(e) => {
            init_tracing("info");
            error!(error = %e, "failed to load configuration, using defaults");
            AppConfig::default()
        }
    };

    info!("starting OCPP 1.6J backend gateway");

    let store = SeaOrmStore::connect(&app_cfg.database_url()).await?;
    info!("running database migrations");
    store.run_migrations().await?;

    let store: Arc<dyn Store> = Arc::new(store);
    store.set_all_stations_offline().await?;
    info!("cleared stale online flags from a previous run");

    let registry = Arc::new(StationRegistry::new());
    let control = Arc::new(ControlService::new(registry.clone(), store.clone()));
    let shutdown = ShutdownSignal::new();

    tokio::spawn(listen_for_os_signals(shutdown.clone()));

    let ws_config = WsListenerConfig {
        bind_addr: format!("0.0.0.0:{}", app_cfg.ws_port),
        utc_offset_hours: app_cfg.utc_offset_hours,
        command_timeout: Duration::from_secs(app_cfg.command_timeout_secs),
    };

    let ws_shutdown = shutdown.clone();
    let ws_store = store.clone();
    let ws_registry = registry.clone();
    let ws_task = tokio::spawn(async move {
        if let Err(e) = run_ws_listener(ws_config, ws_store, ws_registry, ws_shutdown).await {
            error!(error = %e, "WebSocket listener exited with an error");
        }
    });

    let control_app = control_router(control);
    let control_addr = format!("0.0.0.0:{}", app_cfg.control_port);
    let control_listener = tokio::net::TcpListener::bind(&control_addr).await?;
    info!(addr = %control_addr, "control-plane HTTP surface started");

    let http_shutdown = shutdown.clone();
    let http_task = tokio::spawn(async move {
        let server = axum::serve(control_listener, control_app).with_graceful_shutdown(async move {
            http_shutdown.wait().await;
        });
        if let Err(e) = server.await {
            error!(error = %e, "control-plane HTTP surface exited with an error");
        }
    });

    shutdown.wait().await;
    info!("shutdown signal received, draining connections");

    let _ = ws_task.await;
    let _ = http_task.await;

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}
