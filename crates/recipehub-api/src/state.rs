//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use recipehub_auth::jwt::decoder::JwtDecoder;
use recipehub_core::config::AppConfig;
use recipehub_realtime::server::RealtimeEngine;
use recipehub_service::notification::service::NotificationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// WebSocket realtime engine.
    pub realtime_engine: Arc<RealtimeEngine>,
    /// Notification query service.
    pub notification_service: Arc<NotificationService>,
}
