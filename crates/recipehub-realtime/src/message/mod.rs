//! Wire message definitions.

pub mod types;

pub use types::{ClientMessage, RecipeRef, ServerMessage};
