//! Room registry — maps room keys to member connections and back.

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::room::Room;
use super::subscription::MembershipIndex;
use super::types::RoomId;

/// Registry of all active broadcast rooms.
///
/// Rooms are created on first join and dropped when their last member
/// leaves; disconnect cleanup removes a connection from every room it had
/// joined so no dangling membership survives.
#[derive(Debug)]
pub struct RoomRegistry {
    /// Room key → room.
    rooms: DashMap<String, Room>,
    /// Membership reverse index.
    memberships: MembershipIndex,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: MembershipIndex::new(),
        }
    }

    /// Joins a connection to a room. Idempotent.
    pub fn join(&self, room: &RoomId, conn_id: ConnectionId) {
        let key = room.as_room_key();
        self.rooms
            .entry(key.clone())
            .or_insert_with(|| Room::new(key.clone()))
            .join(conn_id);
        self.memberships.add(conn_id, key);
    }

    /// Removes a connection from a room. No-op if absent.
    pub fn leave(&self, room: &RoomId, conn_id: ConnectionId) {
        let key = room.as_room_key();
        if let Some(mut entry) = self.rooms.get_mut(&key) {
            entry.leave(conn_id);
            if entry.is_empty() {
                drop(entry);
                self.rooms.remove(&key);
            }
        }
        self.memberships.remove(conn_id, &key);
    }

    /// Removes a connection from every room it had joined.
    pub fn remove_connection(&self, conn_id: ConnectionId) {
        let rooms = self.memberships.remove_all(conn_id);
        for key in &rooms {
            if let Some(mut entry) = self.rooms.get_mut(key) {
                entry.leave(conn_id);
                if entry.is_empty() {
                    drop(entry);
                    self.rooms.remove(key);
                }
            }
        }
    }

    /// Returns a snapshot of the member set of a room.
    pub fn members(&self, room_key: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_key)
            .map(|room| room.member_snapshot())
            .unwrap_or_default()
    }

    /// Returns whether a connection is currently in a room.
    pub fn is_member(&self, room: &RoomId, conn_id: ConnectionId) -> bool {
        self.rooms
            .get(&room.as_room_key())
            .map(|r| r.members.contains(&conn_id))
            .unwrap_or(false)
    }

    /// Returns the number of memberships for a connection.
    pub fn membership_count(&self, conn_id: ConnectionId) -> usize {
        self.memberships.count(conn_id)
    }

    /// Returns member count for a room.
    pub fn room_member_count(&self, room: &RoomId) -> usize {
        self.rooms
            .get(&room.as_room_key())
            .map(|r| r.member_count())
            .unwrap_or(0)
    }

    /// Returns total number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
