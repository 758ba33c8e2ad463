//! Event fan-out engine — delivers a frame to every connection currently
//! joined to a room, and only those connections.
//!
//! Delivery is best-effort and at-most-once per connection: the member set
//! is snapshotted at broadcast time, a failed or disconnected member is
//! skipped without affecting the rest, and nothing is retried. Each
//! broadcast is also published to the backplane so other instances deliver
//! to their own local members.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::bridge::{Backplane, BackplaneFrame};
use crate::connection::pool::ConnectionPool;
use crate::message::ServerMessage;
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;

/// Fans frames out to room members across all instances.
pub struct FanoutEngine {
    /// Local connection pool.
    pool: Arc<ConnectionPool>,
    /// Local room registry.
    rooms: Arc<RoomRegistry>,
    /// Cross-instance relay.
    backplane: Arc<dyn Backplane>,
    /// This instance's identity, used to skip self-relayed frames.
    node_id: Uuid,
}

impl std::fmt::Debug for FanoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEngine")
            .field("node_id", &self.node_id)
            .finish()
    }
}

impl FanoutEngine {
    /// Creates a new fan-out engine.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        backplane: Arc<dyn Backplane>,
    ) -> Self {
        Self {
            pool,
            rooms,
            backplane,
            node_id: Uuid::new_v4(),
        }
    }

    /// This instance's backplane identity.
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Broadcasts a message to a room, locally and via the backplane.
    pub async fn broadcast(&self, room: &RoomId, message: &ServerMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, room = %room, "Failed to serialize broadcast frame");
                return;
            }
        };

        let room_key = room.as_room_key();
        let delivered = self.deliver_local(&room_key, &payload);
        debug!(room = %room_key, delivered, "Room broadcast");

        let frame = BackplaneFrame {
            origin: self.node_id,
            room: room_key,
            payload,
        };
        if let Err(e) = self.backplane.publish(frame).await {
            warn!(error = %e, "Backplane publish failed, remote members skipped");
        }
    }

    /// Delivers a serialized frame to the local members of a room.
    ///
    /// A member whose send fails is skipped; the remaining members still
    /// receive the frame. Returns the number of successful deliveries.
    pub fn deliver_local(&self, room_key: &str, payload: &str) -> usize {
        let members = self.rooms.members(room_key);
        let mut delivered = 0;
        for conn_id in &members {
            let Some(handle) = self.pool.get(conn_id) else {
                continue;
            };
            if handle.send(payload.to_string()) {
                delivered += 1;
            } else {
                warn!(conn_id = %conn_id, room = %room_key, "Member delivery failed, skipping");
            }
        }
        delivered
    }

    /// Pushes the authoritative unread count to a user's personal room.
    pub async fn push_unread_count(&self, user_id: Uuid, count: i64) {
        let message = ServerMessage::UnreadCount {
            recipient_id: user_id,
            count,
        };
        self.broadcast(&RoomId::user(user_id), &message).await;
    }
}
