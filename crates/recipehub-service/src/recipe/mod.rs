//! Recipe interaction services.

pub mod service;

pub use service::{LikeChange, RecipeService};
