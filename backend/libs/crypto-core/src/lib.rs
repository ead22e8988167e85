//! Shared cryptographic primitives for the blog backend
//!
//! - [`jwt`]: signed, time-limited identity tokens
//! - [`password`]: salted one-way password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenError, TokenService};
pub use password::{hash_password, verify_password, PasswordError};
