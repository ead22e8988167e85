use crypto_core::jwt::TokenService;
use std::sync::Arc;

use crate::store::{MemoryStore, PostRepository, UserRepository};

/// Shared, read-only handles used by every operation
///
/// Cloned into each actix worker and into the GraphQL schema data.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            posts,
            tokens,
        }
    }

    /// State backed by a single in-process [`MemoryStore`]
    pub fn in_memory(tokens: Arc<TokenService>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, tokens)
    }
}
