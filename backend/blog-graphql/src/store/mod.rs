//! Credential and post persistence
//!
//! Resolvers only see the repository traits; the backing document database is
//! an external collaborator. [`MemoryStore`] is the in-process implementation
//! used by the binary and the tests.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PostRecord, UserRecord};

pub use memory::MemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violated
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `Duplicate` if the email is taken
    async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Batch lookup; missing ids are skipped
    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<UserRecord>>;

    /// Append a post reference to the user's post list and persist it
    async fn push_post(&self, user_id: &str, post_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: PostRecord) -> StoreResult<PostRecord>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PostRecord>>;

    /// All posts in insertion order
    async fn find_all(&self) -> StoreResult<Vec<PostRecord>>;

    /// Batch lookup; missing ids are skipped
    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<PostRecord>>;

    async fn count(&self) -> StoreResult<u64>;

    /// Remove a post; missing ids are not an error
    async fn delete(&self, id: &str) -> StoreResult<()>;
}
