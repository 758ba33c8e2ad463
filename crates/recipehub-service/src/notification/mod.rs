//! Notification persistence, reconciliation, and query services.

pub mod reconciler;
pub mod service;
pub mod store;

pub use reconciler::{NotificationDelivery, NotificationReconciler, NotificationRemoval};
pub use service::NotificationService;
pub use store::{NotificationStore, ProfileStore, RecipeStore};
