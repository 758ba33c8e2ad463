//! # recipehub-realtime
//!
//! Real-time WebSocket engine for RecipeHub. Provides:
//!
//! - WebSocket connection management with JWT authentication
//! - Room-scoped pub/sub (`user:<id>`, `recipe:<id>`) with membership
//!   authorization for personal rooms
//! - Event fan-out with per-member failure isolation
//! - Cross-instance delivery via a broadcast backplane (in-memory or Redis)
//! - Notification delivery and unread-count push
//! - A client-side unread badge reducer

pub mod badge;
pub mod bridge;
pub mod connection;
pub mod event_bridge;
pub mod fanout;
pub mod message;
pub mod room;
pub mod server;

pub use badge::BadgeSynchronizer;
pub use connection::manager::ConnectionManager;
pub use event_bridge::EventBridge;
pub use fanout::FanoutEngine;
pub use room::registry::RoomRegistry;
pub use server::RealtimeEngine;
