//! Room-scoped pub/sub membership.

pub mod registry;
pub mod room;
pub mod subscription;
pub mod types;

pub use registry::RoomRegistry;
pub use types::RoomId;
