//! # recipehub-api
//!
//! HTTP API layer for RecipeHub: the axum router, REST notification
//! endpoints, health checks, and the WebSocket upgrade into the real-time
//! engine.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
