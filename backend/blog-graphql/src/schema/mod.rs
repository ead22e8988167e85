//! GraphQL schema
//!
//! Queries: `login`, `posts`, `post`, `health`.
//! Mutations: `createUser`, `createPost`.

pub mod auth;
pub mod loaders;
pub mod post;
pub mod user;

use async_graphql::{dataloader::DataLoader, EmptySubscription, MergedObject, Schema};

use crate::config::GraphQLConfig;
use crate::state::AppState;

#[derive(MergedObject, Default)]
pub struct QueryRoot(auth::AuthQuery, post::PostQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(user::UserMutation, post::PostMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with shared state, DataLoaders and query limits
///
/// The per-request [`AuthContext`](crate::middleware::AuthContext) is not
/// schema data; the HTTP handler attaches it to each request.
pub fn build_schema(state: AppState, config: &GraphQLConfig) -> AppSchema {
    let users = DataLoader::new(loaders::UserLoader::new(state.users.clone()), tokio::task::spawn);
    let posts = DataLoader::new(loaders::PostLoader::new(state.posts.clone()), tokio::task::spawn);

    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(state)
    .data(users)
    .data(posts)
    .limit_depth(config.max_depth)
    .limit_complexity(config.max_complexity);

    if !config.introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
