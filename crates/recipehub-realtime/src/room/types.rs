//! Room key definitions and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recipehub_core::types::id::{RecipeId, UserId};

/// Typed room identifiers.
///
/// A room is a logical broadcast group; it exists only as the set of
/// connections currently joined to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum RoomId {
    /// Personal user room — notifications and unread-count pushes.
    User(UserId),
    /// Recipe room — comment and rating activity on one recipe.
    Recipe(RecipeId),
}

impl RoomId {
    /// Room for a user's personal notifications.
    pub fn user(user_id: Uuid) -> Self {
        Self::User(UserId::from(user_id))
    }

    /// Room for activity on a recipe.
    pub fn recipe(recipe_id: Uuid) -> Self {
        Self::Recipe(RecipeId::from(recipe_id))
    }

    /// Parses a room string into a typed room id.
    pub fn parse(room: &str) -> Option<Self> {
        let parts: Vec<&str> = room.splitn(2, ':').collect();
        match parts.as_slice() {
            ["user", id] => Uuid::parse_str(id).ok().map(Self::user),
            ["recipe", id] => Uuid::parse_str(id).ok().map(Self::recipe),
            _ => None,
        }
    }

    /// Converts to the wire/backplane room string.
    pub fn as_room_key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Recipe(id) => format!("recipe:{id}"),
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_room_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let user_room = RoomId::user(Uuid::new_v4());
        assert_eq!(RoomId::parse(&user_room.as_room_key()), Some(user_room));

        let recipe_room = RoomId::recipe(Uuid::new_v4());
        assert_eq!(RoomId::parse(&recipe_room.as_room_key()), Some(recipe_room));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(RoomId::parse("user:not-a-uuid"), None);
        assert_eq!(RoomId::parse("kitchen:123"), None);
        assert_eq!(RoomId::parse("user"), None);
    }
}
