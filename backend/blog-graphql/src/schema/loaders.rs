//! DataLoaders for per-request batching of store reads
//!
//! `Post.creator` and `User.posts` are resolved through these so a listing of
//! N posts costs one user lookup instead of N.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PostRecord, UserRecord};
use crate::store::{PostRepository, StoreError, UserRepository};

/// Batches user lookups by id
#[derive(Clone)]
pub struct UserLoader {
    users: Arc<dyn UserRepository>,
}

impl UserLoader {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl Loader<String> for UserLoader {
    type Value = UserRecord;
    type Error = StoreError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let users = self.users.find_many(keys).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }
}

/// Batches post lookups by id
#[derive(Clone)]
pub struct PostLoader {
    posts: Arc<dyn PostRepository>,
}

impl PostLoader {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }
}

#[async_trait::async_trait]
impl Loader<String> for PostLoader {
    type Value = PostRecord;
    type Error = StoreError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let posts = self.posts.find_many(keys).await?;
        Ok(posts.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}
