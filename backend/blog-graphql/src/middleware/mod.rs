//! Request middleware

pub mod auth;
pub mod jwt;

pub use auth::{auth_context, AuthContext};
pub use jwt::{authenticate, AuthGate};
