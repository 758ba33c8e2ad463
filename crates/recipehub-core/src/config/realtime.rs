//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Per-connection outbound message buffer size.
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
    /// Maximum room memberships per connection.
    #[serde(default = "default_max_rooms")]
    pub max_rooms_per_connection: usize,
    /// Cross-instance broadcast backplane settings.
    #[serde(default)]
    pub backplane: BackplaneConfig,
    /// Notification retention settings.
    #[serde(default)]
    pub notifications: NotificationRealtimeConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            send_buffer_size: default_send_buffer(),
            max_rooms_per_connection: default_max_rooms(),
            backplane: BackplaneConfig::default(),
            notifications: NotificationRealtimeConfig::default(),
        }
    }
}

/// Broadcast backplane configuration for multi-instance deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackplaneConfig {
    /// Backplane provider: `"memory"` (single instance) or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis URL, required when provider is `"redis"`.
    #[serde(default)]
    pub redis_url: String,
    /// Relay channel buffer size.
    #[serde(default = "default_backplane_buffer")]
    pub buffer_size: usize,
}

impl Default for BackplaneConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: String::new(),
            buffer_size: default_backplane_buffer(),
        }
    }
}

/// Notification retention settings for the real-time engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRealtimeConfig {
    /// Number of days after which stored notifications are cleaned up.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Interval between retention sweeps in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for NotificationRealtimeConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_send_buffer() -> usize {
    256
}

fn default_max_rooms() -> usize {
    50
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_backplane_buffer() -> usize {
    1024
}

fn default_retention_days() -> u32 {
    30
}

fn default_sweep_interval() -> u64 {
    3600
}
