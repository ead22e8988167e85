//! Post type, listing queries and creation mutation

use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, ErrorExtensions, InputObject, Object,
    Result as GraphQLResult, SimpleObject, ID,
};

use super::loaders::UserLoader;
use super::user::User;
use crate::error::ApiError;
use crate::middleware::auth_context;
use crate::models::PostRecord;
use crate::services::{self, NewPost};
use crate::state::AppState;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Post {
    #[graphql(name = "_id")]
    pub id: ID,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    #[graphql(skip)]
    pub creator_id: String,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

impl From<PostRecord> for Post {
    fn from(post: PostRecord) -> Self {
        Self {
            id: ID(post.id),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator_id: post.creator_id,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

#[ComplexObject]
impl Post {
    async fn creator(&self, ctx: &Context<'_>) -> GraphQLResult<User> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let creator = loader
            .load_one(self.creator_id.clone())
            .await
            .map_err(|e| ApiError::from(e).extend())?;

        creator
            .map(User::from)
            .ok_or_else(|| ApiError::NotFound("Creator not found.".to_string()).extend())
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct PostData {
    pub posts: Vec<Post>,
    pub total_posts: i32,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "postInputData")]
pub struct PostInputData {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// Every post with the total count; requires authentication
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<PostData> {
        let state = ctx.data::<AppState>()?;
        let auth = auth_context(ctx);

        let page = services::list_posts(state, &auth)
            .await
            .map_err(|e| e.extend())?;

        Ok(PostData {
            total_posts: i32::try_from(page.total_posts).unwrap_or(i32::MAX),
            posts: page.posts.into_iter().map(Post::from).collect(),
        })
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Post> {
        let state = ctx.data::<AppState>()?;
        let auth = auth_context(ctx);

        let post = services::get_post(state, &auth, &id)
            .await
            .map_err(|e| e.extend())?;

        Ok(post.into())
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        post_input: PostInputData,
    ) -> GraphQLResult<Post> {
        let state = ctx.data::<AppState>()?;
        let auth = auth_context(ctx);

        let post = services::create_post(
            state,
            &auth,
            NewPost {
                title: post_input.title,
                content: post_input.content,
                image_url: post_input.image_url,
            },
        )
        .await
        .map_err(|e| e.extend())?;

        Ok(post.into())
    }
}
