//! Redis pub/sub backplane for multi-instance deployments.

/// Redis channel carrying all room frames.
#[cfg(feature = "redis-pubsub")]
const BACKPLANE_CHANNEL: &str = "recipehub:rooms";

#[cfg(feature = "redis-pubsub")]
pub mod implementation {
    use std::sync::Arc;

    use async_trait::async_trait;
    use futures::StreamExt;
    use tokio::sync::mpsc;
    use tracing::{error, warn};

    use recipehub_core::config::BackplaneConfig;
    use recipehub_core::error::AppError;
    use recipehub_core::result::AppResult;

    use super::super::{Backplane, BackplaneFrame};
    use super::BACKPLANE_CHANNEL;

    /// Redis pub/sub backplane for cross-instance frame relay.
    #[derive(Debug, Clone)]
    pub struct RedisPubSub {
        /// Redis URL.
        url: String,
        /// Relay channel buffer size.
        buffer_size: usize,
    }

    impl RedisPubSub {
        /// Creates and validates a Redis backplane from configuration.
        pub fn build(config: &BackplaneConfig) -> AppResult<Arc<dyn Backplane>> {
            if config.redis_url.is_empty() {
                return Err(AppError::configuration(
                    "Backplane provider is redis but redis_url is empty",
                ));
            }
            Ok(Arc::new(Self {
                url: config.redis_url.clone(),
                buffer_size: config.buffer_size.max(1),
            }))
        }
    }

    #[async_trait]
    impl Backplane for RedisPubSub {
        async fn publish(&self, frame: BackplaneFrame) -> AppResult<()> {
            let client = redis::Client::open(self.url.as_str())
                .map_err(|e| AppError::internal(format!("Redis connection failed: {e}")))?;

            let mut conn = client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| AppError::internal(format!("Redis connection failed: {e}")))?;

            let payload = serde_json::to_string(&frame)?;
            redis::cmd("PUBLISH")
                .arg(BACKPLANE_CHANNEL)
                .arg(payload)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| AppError::internal(format!("Redis PUBLISH failed: {e}")))?;

            Ok(())
        }

        fn subscribe(&self) -> mpsc::Receiver<BackplaneFrame> {
            let url = self.url.clone();
            let (tx, rx) = mpsc::channel(self.buffer_size);

            tokio::spawn(async move {
                let client = match redis::Client::open(url.as_str()) {
                    Ok(c) => c,
                    Err(e) => {
                        error!(error = %e, "Redis backplane subscribe failed to open client");
                        return;
                    }
                };
                let mut pubsub = match client.get_async_pubsub().await {
                    Ok(p) => p,
                    Err(e) => {
                        error!(error = %e, "Redis backplane subscribe failed to connect");
                        return;
                    }
                };
                if let Err(e) = pubsub.subscribe(BACKPLANE_CHANNEL).await {
                    error!(error = %e, "Redis backplane SUBSCRIBE failed");
                    return;
                }

                let mut stream = pubsub.on_message();
                while let Some(msg) = stream.next().await {
                    let payload: String = match msg.get_payload() {
                        Ok(p) => p,
                        Err(e) => {
                            warn!(error = %e, "Unreadable backplane payload, skipping");
                            continue;
                        }
                    };
                    match serde_json::from_str::<BackplaneFrame>(&payload) {
                        Ok(frame) => {
                            if tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Malformed backplane frame, skipping");
                        }
                    }
                }
            });

            rx
        }
    }
}

#[cfg(not(feature = "redis-pubsub"))]
pub mod implementation {
    use std::sync::Arc;

    use recipehub_core::error::AppError;
    use recipehub_core::result::AppResult;

    use super::super::Backplane;

    /// Stub Redis backplane when the redis feature is disabled.
    #[derive(Debug, Clone)]
    pub struct RedisPubSub;

    impl RedisPubSub {
        /// Always refuses: selecting the redis provider requires the
        /// `redis-pubsub` feature.
        pub fn build(
            _config: &recipehub_core::config::BackplaneConfig,
        ) -> AppResult<Arc<dyn Backplane>> {
            Err(AppError::configuration(
                "Backplane provider 'redis' requires the redis-pubsub feature",
            ))
        }
    }
}

pub use implementation::RedisPubSub;
