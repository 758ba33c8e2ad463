//! Concrete repository implementations.

pub mod comment;
pub mod like;
pub mod notification;
pub mod rating;
pub mod recipe;
pub mod user;

pub use comment::CommentRepository;
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use rating::RatingRepository;
pub use recipe::RecipeRepository;
pub use user::UserRepository;
