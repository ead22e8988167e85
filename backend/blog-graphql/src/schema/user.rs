//! User type and registration mutation

use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, ErrorExtensions, InputObject, Object,
    Result as GraphQLResult, SimpleObject, ID,
};

use super::loaders::PostLoader;
use super::post::Post;
use crate::error::ApiError;
use crate::models::UserRecord;
use crate::services::{self, NewUser};
use crate::state::AppState;

/// Registered account. The password hash is never exposed.
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    #[graphql(name = "_id")]
    pub id: ID,
    pub email: String,
    pub name: Option<String>,
    pub status: String,
    #[graphql(skip)]
    pub post_ids: Vec<String>,
}

impl From<UserRecord> for User {
    fn from(user: UserRecord) -> Self {
        Self {
            id: ID(user.id),
            email: user.email,
            name: user.name,
            status: user.status,
            post_ids: user.posts,
        }
    }
}

#[ComplexObject]
impl User {
    /// Posts created by this user, oldest first
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let loader = ctx.data::<DataLoader<PostLoader>>()?;
        let mut found = loader
            .load_many(self.post_ids.iter().cloned())
            .await
            .map_err(|e| ApiError::from(e).extend())?;

        Ok(self
            .post_ids
            .iter()
            .filter_map(|id| found.remove(id))
            .map(Post::from)
            .collect())
    }
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "userInputData")]
pub struct UserInputData {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        user_input: UserInputData,
    ) -> GraphQLResult<User> {
        let state = ctx.data::<AppState>()?;

        let user = services::create_user(
            state,
            NewUser {
                email: user_input.email,
                password: user_input.password,
                name: user_input.name,
            },
        )
        .await
        .map_err(|e| e.extend())?;

        Ok(user.into())
    }
}
