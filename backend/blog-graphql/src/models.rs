//! Persisted document shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_USER_STATUS: &str = "I am new!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    /// Argon2 PHC string, never the plaintext
    pub password_hash: String,
    pub status: String,
    /// Owned post ids, append-only, in creation order
    pub posts: Vec<String>,
}

impl UserRecord {
    pub fn new(email: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            password_hash,
            status: DEFAULT_USER_STATUS.to_string(),
            posts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Set at creation, immutable thereafter
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRecord {
    pub fn new(
        title: String,
        content: String,
        image_url: Option<String>,
        creator_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            image_url,
            creator_id,
            created_at: now,
            updated_at: now,
        }
    }
}
