mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use creatordb_phyllo::PhylloClient;
use creatordb_sync::{CreatorService, SyncSettings};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = creatordb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = creatordb_db::connect_pool_from_config(&config).await?;
    let applied = creatordb_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let phyllo = PhylloClient::from_config(&config)?;
    let service = Arc::new(CreatorService::new(
        pool.clone(),
        Arc::new(phyllo),
        SyncSettings::from_app_config(&config),
    ));

    let _scheduler = match config.sync_cron.as_deref() {
        Some(cron) => Some(scheduler::build_scheduler(Arc::clone(&service), cron).await?),
        None => {
            tracing::info!("CREATORDB_SYNC_CRON not set; scheduled sync disabled");
            None
        }
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        creatordb_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, service }, auth, default_rate_limit_state());

    tracing::info!(
        bind_addr = %config.bind_addr,
        env = %config.env,
        phyllo_environment = ?config.phyllo_environment,
        "creatordb server listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
