//! Operation logic behind the GraphQL resolvers
//!
//! Each function combines the auth verdict, input validation and store access
//! for one operation and fails with a typed [`ApiError`](crate::error::ApiError).
//! The GraphQL layer only maps arguments in and results out.

pub mod posts;
pub mod users;

pub use posts::{create_post, get_post, list_posts, NewPost, PostPage};
pub use users::{create_user, login, AuthPayload, NewUser};
