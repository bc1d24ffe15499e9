//! 贡献者排行榜服务入口

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use leaderboard_service::{
    AppState, EventClassifier, MIGRATOR, RankingStore, ScoringPolicy, routes,
};
use leaderboard_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tracing::{info, warn};

const SERVICE_NAME: &str = "leaderboard-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // .env 是可选的
        if !e.not_found() {
            eprintln!("Failed to read .env file: {e}");
        }
    }

    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    config.validate().context("配置校验失败")?;

    info!(
        environment = %config.environment,
        leaderboard = %config.leaderboard.name,
        qualifying_label = %config.leaderboard.qualifying_label,
        exempt_users = config.leaderboard.exempt_users.len(),
        "Starting {SERVICE_NAME}"
    );
    if config.is_production() && config.leaderboard.exempt_users.is_empty() {
        warn!("No exempt users configured, maintainers will accumulate points");
    }

    let db = Database::connect(&config.database).await?;
    db.run_migrations(&MIGRATOR).await?;

    let store = RankingStore::postgres(db.pool().clone());
    let leaderboard = store
        .get_or_create_leaderboard(&config.leaderboard.name)
        .await
        .context("无法创建排行榜")?;
    info!(leaderboard_id = %leaderboard.id, name = %leaderboard.name, "Leaderboard ready");

    let policy = Arc::new(ScoringPolicy::from_config(&config.leaderboard));
    let classifier = EventClassifier::new(store.clone(), policy, leaderboard.id.clone());

    let state = AppState::new(
        store,
        classifier,
        leaderboard,
        &config.leaderboard.webhook_secret,
    )
    .with_database(db.clone());

    let app = routes::app(
        state,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
