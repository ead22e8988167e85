use tracing::{error, info};

use crate::error::{ApiError, Result};
use crate::middleware::AuthContext;
use crate::models::PostRecord;
use crate::state::AppState;
use crate::validators::{validate_post_input, PostInput};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<PostRecord>,
    pub total_posts: u64,
}

/// Create a post owned by the authenticated user
///
/// Order of checks: authentication, field validation, creator lookup. Nothing
/// is written unless all three pass. On success the post id is appended to the
/// creator's post list; if that append fails the post is removed again.
pub async fn create_post(state: &AppState, auth: &AuthContext, input: NewPost) -> Result<PostRecord> {
    let user_id = auth.require_user()?;

    let NewPost {
        title,
        content,
        image_url,
    } = input;
    let fields = PostInput { title, content };
    validate_post_input(&fields)?;

    // The token may outlive its user
    let Some(creator) = state.users.find_by_id(user_id).await? else {
        return Err(ApiError::Unauthenticated("Invalid user.".to_string()));
    };

    let image_url = image_url.filter(|url| !url.trim().is_empty());
    let post = state
        .posts
        .insert(PostRecord::new(fields.title, fields.content, image_url, creator.id))
        .await?;

    if let Err(e) = state.users.push_post(&post.creator_id, &post.id).await {
        if let Err(cleanup) = state.posts.delete(&post.id).await {
            error!(post_id = %post.id, error = %cleanup, "Failed to remove orphaned post");
        }
        return Err(e.into());
    }

    info!(user_id = %post.creator_id, post_id = %post.id, "Post created");
    Ok(post)
}

/// All posts plus the total count
pub async fn list_posts(state: &AppState, auth: &AuthContext) -> Result<PostPage> {
    auth.require_user()?;

    let total_posts = state.posts.count().await?;
    let posts = state.posts.find_all().await?;

    Ok(PostPage { posts, total_posts })
}

pub async fn get_post(state: &AppState, auth: &AuthContext, id: &str) -> Result<PostRecord> {
    auth.require_user()?;

    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Could not find post.".to_string()))
}
