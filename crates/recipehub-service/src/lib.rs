//! # recipehub-service
//!
//! Business logic for RecipeHub. Orchestrates repositories for the primary
//! recipe interactions (likes, comments, ratings) and reconciles persisted
//! notification state against those actions.

pub mod context;
pub mod notification;
pub mod recipe;

pub use notification::reconciler::NotificationReconciler;
pub use notification::service::NotificationService;
pub use recipe::service::RecipeService;
