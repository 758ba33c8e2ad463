//! # recipehub-auth
//!
//! JWT token encoding and validation for RecipeHub. Session issuance lives
//! in the external identity service; this crate mints tokens for tests and
//! tooling and validates the tokens presented on HTTP requests and
//! WebSocket upgrades.

pub mod jwt;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
