//! Connection manager — handles connection lifecycle and inbound routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use recipehub_core::config::RealtimeConfig;
use recipehub_service::context::RequestContext;

use crate::event_bridge::EventBridge;
use crate::message::{ClientMessage, ServerMessage};
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;

use super::authenticator::AuthenticatedConnection;
use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Room registry.
    rooms: Arc<RoomRegistry>,
    /// Domain action bridge.
    bridge: Arc<EventBridge>,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.pool.connection_count())
            .finish()
    }
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        bridge: Arc<EventBridge>,
    ) -> Self {
        Self {
            pool,
            rooms,
            bridge,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the connection handle and the receiver feeding the socket's
    /// outbound task. The connection is joined to its own user room
    /// immediately so notifications flow without a join round-trip.
    pub fn register(
        &self,
        auth: &AuthenticatedConnection,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.send_buffer_size);

        let handle = Arc::new(ConnectionHandle::new(
            auth.user_id,
            auth.session_id,
            auth.username.clone(),
            tx,
        ));

        let existing = self.pool.get_user_connections(&auth.user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id = %auth.user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, closing oldest"
            );
            if let Some(oldest) = existing.iter().min_by_key(|c| c.connected_at) {
                oldest.mark_dead();
                let oldest_id = oldest.id;
                self.pool.remove(&oldest_id);
                self.rooms.remove_connection(oldest_id);
            }
        }

        self.pool.add(handle.clone());
        self.rooms.join(&RoomId::user(auth.user_id), handle.id);

        info!(
            conn_id = %handle.id,
            user_id = %auth.user_id,
            session_id = %auth.session_id,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and cleans up every room membership.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.rooms.remove_connection(*conn_id);

            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Processes an inbound frame from a client.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_frame: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };

        let msg: ClientMessage = match serde_json::from_str(raw_frame) {
            Ok(m) => m,
            Err(e) => {
                self.reply(
                    &handle,
                    &ServerMessage::Error {
                        code: "INVALID_MESSAGE".to_string(),
                        message: format!("Failed to parse frame: {e}"),
                    },
                );
                return;
            }
        };

        match msg {
            ClientMessage::JoinUserRoom { user_id } => {
                self.handle_join_user_room(&handle, user_id);
            }
            ClientMessage::JoinRecipeRoom { recipe_id } => {
                self.handle_join_recipe_room(&handle, recipe_id);
            }
            ClientMessage::LeaveRecipeRoom { recipe_id } => {
                let room = RoomId::recipe(recipe_id);
                self.rooms.leave(&room, handle.id);
                self.reply(
                    &handle,
                    &ServerMessage::RoomLeft {
                        room: room.as_room_key(),
                    },
                );
                debug!(conn_id = %handle.id, room = %room, "Left room");
            }
            ClientMessage::LikeRecipe {
                recipe_id,
                user_id,
                is_liked,
            } => {
                let Some(ctx) = self.action_context(&handle, user_id) else {
                    return;
                };
                if let Err(e) = self.bridge.on_like(&ctx, recipe_id, is_liked).await {
                    self.reply_error(&handle, e);
                }
            }
            ClientMessage::NewComment {
                recipe_id,
                user_id,
                comment_text,
            } => {
                let Some(ctx) = self.action_context(&handle, user_id) else {
                    return;
                };
                if let Err(e) = self.bridge.on_comment(&ctx, recipe_id, &comment_text).await {
                    self.reply_error(&handle, e);
                }
            }
            ClientMessage::RateRecipe {
                recipe_id,
                user_id,
                rating,
            } => {
                let Some(ctx) = self.action_context(&handle, user_id) else {
                    return;
                };
                if let Err(e) = self.bridge.on_rating(&ctx, recipe_id, rating).await {
                    self.reply_error(&handle, e);
                }
            }
        }
    }

    /// Personal rooms require the authenticated identity to match the room.
    fn handle_join_user_room(&self, handle: &ConnectionHandle, user_id: Uuid) {
        if user_id != handle.user_id {
            warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                requested = %user_id,
                "Refused join to another user's room"
            );
            self.reply(
                handle,
                &ServerMessage::Error {
                    code: "FORBIDDEN".to_string(),
                    message: "Cannot join another user's room".to_string(),
                },
            );
            return;
        }

        let room = RoomId::user(user_id);
        self.rooms.join(&room, handle.id);
        self.reply(
            handle,
            &ServerMessage::RoomJoined {
                room: room.as_room_key(),
            },
        );
    }

    fn handle_join_recipe_room(&self, handle: &ConnectionHandle, recipe_id: Uuid) {
        let current = self.rooms.membership_count(handle.id);
        if current >= self.config.max_rooms_per_connection {
            self.reply(
                handle,
                &ServerMessage::Error {
                    code: "MAX_ROOMS".to_string(),
                    message: format!(
                        "Maximum room memberships ({}) reached",
                        self.config.max_rooms_per_connection
                    ),
                },
            );
            return;
        }

        let room = RoomId::recipe(recipe_id);
        self.rooms.join(&room, handle.id);
        self.reply(
            handle,
            &ServerMessage::RoomJoined {
                room: room.as_room_key(),
            },
        );
        debug!(conn_id = %handle.id, room = %room, "Joined room");
    }

    /// Builds the request context for an action, enforcing that any claimed
    /// actor id matches the authenticated identity.
    fn action_context(
        &self,
        handle: &ConnectionHandle,
        claimed_user_id: Option<Uuid>,
    ) -> Option<RequestContext> {
        if let Some(claimed) = claimed_user_id {
            if claimed != handle.user_id {
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    claimed = %claimed,
                    "Rejected action with mismatched actor id"
                );
                self.reply(
                    handle,
                    &ServerMessage::Error {
                        code: "IDENTITY_MISMATCH".to_string(),
                        message: "Payload user id does not match the connection".to_string(),
                    },
                );
                return None;
            }
        }
        Some(RequestContext::new(
            handle.user_id,
            handle.session_id,
            handle.username.clone(),
        ))
    }

    /// Sends a direct reply to one connection.
    fn reply(&self, handle: &ConnectionHandle, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(text) => {
                handle.send(text);
            }
            Err(e) => warn!(error = %e, "Failed to serialize reply"),
        }
    }

    fn reply_error(&self, handle: &ConnectionHandle, error: recipehub_core::error::AppError) {
        self.reply(
            handle,
            &ServerMessage::Error {
                code: error.kind.to_string(),
                message: error.message,
            },
        );
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Checks if a user currently has at least one connection.
    pub fn is_user_connected(&self, user_id: &Uuid) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }

    /// Closes all connections (shutdown path).
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_dead();
            self.pool.remove(&conn.id);
            self.rooms.remove_connection(conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }
}
