//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use recipehub_core::config::RealtimeConfig;
use recipehub_core::error::AppError;
use recipehub_service::notification::reconciler::NotificationReconciler;
use recipehub_service::recipe::service::RecipeService;

use crate::bridge::{Backplane, build_backplane};
use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::event_bridge::EventBridge;
use crate::fanout::FanoutEngine;
use crate::room::registry::RoomRegistry;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Fan-out engine.
    pub fanout: Arc<FanoutEngine>,
    /// Domain action bridge.
    pub event_bridge: Arc<EventBridge>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems and starts the
    /// backplane relay.
    pub fn new(
        config: &RealtimeConfig,
        recipes: Arc<RecipeService>,
        reconciler: Arc<NotificationReconciler>,
    ) -> Result<Self, AppError> {
        let (shutdown_tx, _) = broadcast::channel(1);

        let backplane = build_backplane(&config.backplane)?;
        let pool = Arc::new(ConnectionPool::new());
        let rooms = Arc::new(RoomRegistry::new());
        let fanout = Arc::new(FanoutEngine::new(
            pool.clone(),
            rooms.clone(),
            backplane.clone(),
        ));
        let event_bridge = Arc::new(EventBridge::new(recipes, reconciler, fanout.clone()));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            pool,
            rooms.clone(),
            event_bridge.clone(),
        ));

        Self::spawn_relay(backplane, fanout.clone(), shutdown_tx.subscribe());

        info!(node_id = %fanout.node_id(), "Real-time engine initialized");

        Ok(Self {
            connections,
            rooms,
            fanout,
            event_bridge,
            shutdown_tx,
        })
    }

    /// Relays backplane frames from other instances to local room members.
    fn spawn_relay(
        backplane: Arc<dyn Backplane>,
        fanout: Arc<FanoutEngine>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let mut frames = backplane.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = frames.recv() => {
                        let Some(frame) = frame else { break };
                        if frame.origin == fanout.node_id() {
                            continue;
                        }
                        let delivered = fanout.deliver_local(&frame.room, &frame.payload);
                        debug!(room = %frame.room, delivered, "Relayed backplane frame");
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
            debug!("Backplane relay stopped");
        });
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}
