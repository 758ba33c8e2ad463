//! Cross-instance broadcast backplane.
//!
//! Room membership is process-local, so a frame broadcast on one instance
//! must be relayed to every other instance for delivery to their local
//! members. Frames carry the origin node id; a node ignores its own frames
//! when they come back around.

pub mod memory_pubsub;
pub mod redis_pubsub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use recipehub_core::config::BackplaneConfig;
use recipehub_core::error::AppError;
use recipehub_core::result::AppResult;

pub use memory_pubsub::MemoryPubSub;
pub use redis_pubsub::RedisPubSub;

/// A room broadcast relayed between instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackplaneFrame {
    /// The instance that originated the broadcast.
    pub origin: Uuid,
    /// Room key the payload targets.
    pub room: String,
    /// Serialized [`ServerMessage`](crate::message::ServerMessage) frame.
    pub payload: String,
}

/// Pub/sub transport carrying room broadcasts between instances.
#[async_trait]
pub trait Backplane: Send + Sync + 'static {
    /// Publish a frame to every instance (including, possibly, this one).
    async fn publish(&self, frame: BackplaneFrame) -> AppResult<()>;

    /// Subscribe to the relayed frame stream.
    fn subscribe(&self) -> mpsc::Receiver<BackplaneFrame>;
}

/// Build the configured backplane.
pub fn build_backplane(config: &BackplaneConfig) -> AppResult<std::sync::Arc<dyn Backplane>> {
    match config.provider.as_str() {
        "memory" => Ok(std::sync::Arc::new(MemoryPubSub::new(config.buffer_size))),
        "redis" => RedisPubSub::build(config),
        other => Err(AppError::configuration(format!(
            "Unknown backplane provider: {other}"
        ))),
    }
}
