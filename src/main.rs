//! RecipeHub Server — real-time recipe activity and notification service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use recipehub_auth::jwt::decoder::JwtDecoder;
use recipehub_core::config::{AppConfig, NotificationRealtimeConfig};
use recipehub_core::error::AppError;
use recipehub_database::connection::DatabasePool;
use recipehub_database::repositories::{
    CommentRepository, LikeRepository, NotificationRepository, RatingRepository, RecipeRepository,
    UserRepository,
};
use recipehub_realtime::server::RealtimeEngine;
use recipehub_service::notification::reconciler::NotificationReconciler;
use recipehub_service::notification::service::NotificationService;
use recipehub_service::recipe::service::RecipeService;

#[tokio::main]
async fn main() {
    let env = std::env::var("RECIPEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RecipeHub v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    let db = DatabasePool::connect(&config.database).await?;
    recipehub_database::migration::run_migrations(db.pool()).await?;
    let db_pool = db.pool().clone();

    // Repositories
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let recipe_repo = Arc::new(RecipeRepository::new(db_pool.clone()));
    let like_repo = Arc::new(LikeRepository::new(db_pool.clone()));
    let comment_repo = Arc::new(CommentRepository::new(db_pool.clone()));
    let rating_repo = Arc::new(RatingRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));

    // Auth
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // Services
    let recipe_service = Arc::new(RecipeService::new(
        Arc::clone(&recipe_repo),
        Arc::clone(&like_repo),
        Arc::clone(&comment_repo),
        Arc::clone(&rating_repo),
        Arc::clone(&user_repo),
    ));
    let notification_service = Arc::new(NotificationService::new(Arc::clone(&notification_repo)));
    let reconciler = Arc::new(NotificationReconciler::new(
        Arc::clone(&user_repo) as Arc<dyn recipehub_service::notification::store::ProfileStore>,
        Arc::clone(&recipe_repo) as Arc<dyn recipehub_service::notification::store::RecipeStore>,
        Arc::clone(&notification_repo)
            as Arc<dyn recipehub_service::notification::store::NotificationStore>,
    ));

    // Real-time engine
    let realtime_engine = Arc::new(RealtimeEngine::new(
        &config.realtime,
        Arc::clone(&recipe_service),
        reconciler,
    )?);

    // Shutdown channel for background tasks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Notification retention sweep
    let sweep_handle = spawn_retention_sweep(
        Arc::clone(&notification_repo),
        config.realtime.notifications.clone(),
        shutdown_rx,
    );

    // HTTP server
    let app_state = recipehub_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool,
        jwt_decoder,
        realtime_engine: Arc::clone(&realtime_engine),
        notification_service,
    };
    let app = recipehub_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("RecipeHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    realtime_engine.shutdown();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let _ = tokio::time::timeout(grace, sweep_handle).await;
    db.close().await;

    tracing::info!("RecipeHub server shut down gracefully");
    Ok(())
}

/// Periodically deletes notifications past the retention window.
fn spawn_retention_sweep(
    notification_repo: Arc<NotificationRepository>,
    settings: NotificationRealtimeConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(settings.sweep_interval_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; consume it so the sweep waits a
        // full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let cutoff = Utc::now() - chrono::Duration::days(i64::from(settings.retention_days));
                    match notification_repo.cleanup_old(cutoff).await {
                        Ok(0) => {}
                        Ok(removed) => tracing::info!(removed, "Notification retention sweep"),
                        Err(e) => tracing::warn!(error = %e, "Notification retention sweep failed"),
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        tracing::debug!("Notification retention sweep stopped");
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
