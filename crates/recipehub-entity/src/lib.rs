//! # recipehub-entity
//!
//! Domain entity models for RecipeHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod comment;
pub mod notification;
pub mod recipe;
pub mod user;
