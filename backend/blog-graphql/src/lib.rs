//! Blog GraphQL backend
//!
//! Users register and log in for a bearer token, then create and list posts
//! through a single GraphQL endpoint. Post images are uploaded separately.

pub mod config;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod rest_api;
pub mod schema;
pub mod services;
pub mod state;
pub mod store;
pub mod validators;

pub use error::ApiError;
pub use state::AppState;
