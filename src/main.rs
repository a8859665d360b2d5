// StakeChain ledger - HTTP host entry point

use std::sync::{Arc, Mutex};

use stakechain_ledger::app_state::{AppState, SharedState};
use stakechain_ledger::config::ServerConfig;
use stakechain_ledger::routes;

#[tokio::main]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let app_state = match AppState::bootstrap(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize ledger");
            std::process::exit(1);
        }
    };

    let state: SharedState = Arc::new(Mutex::new(app_state));

    // Periodic snapshots bound what a crash can lose
    if let Some(period) = config.snapshot_interval {
        let snapshot_state = state.clone();
        let state_file = config.state_file.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = AppState::persist(&snapshot_state, &state_file) {
                    tracing::error!(error = %e, "snapshot failed");
                }
            }
        });
    }

    // Clone state for the shutdown save before moving it into the router
    let shutdown_state = state.clone();
    let app = routes::router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.bind, "StakeChain ledger listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("shutting down, saving state");
    if let Err(e) = AppState::persist(&shutdown_state, &config.state_file) {
        tracing::error!(error = %e, "failed to save state");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install CTRL+C handler");
    }
}
