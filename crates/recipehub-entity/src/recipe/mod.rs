//! Recipe entity.

pub mod model;

pub use model::{Recipe, RecipeHead, RatingSummary};
