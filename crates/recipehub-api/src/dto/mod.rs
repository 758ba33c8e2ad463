//! Request/response data transfer objects.

pub mod response;

pub use response::{ApiResponse, CountResponse, DetailedHealthResponse, HealthResponse};
