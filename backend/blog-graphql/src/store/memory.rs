use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{PostRepository, StoreError, StoreResult, UserRepository};
use crate::models::{PostRecord, UserRecord};

/// Concurrent in-memory document store
///
/// Users are keyed by id with a unique email index; posts keep an insertion
/// sequence so listings come back in creation order.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, UserRecord>,
    emails: DashMap<String, String>,
    posts: DashMap<String, (u64, PostRecord)>,
    post_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord> {
        // The email index entry is the uniqueness constraint: two racing
        // registrations for one email cannot both get past it.
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("User exists already!".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                self.users.insert(user.id.clone(), user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        UserRepository::find_by_id(self, &id).await
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<UserRecord>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.value().clone()))
            .collect())
    }

    async fn push_post(&self, user_id: &str, post_id: &str) -> StoreResult<()> {
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.posts.push(post_id.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound("User not found.".to_string())),
        }
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: PostRecord) -> StoreResult<PostRecord> {
        let seq = self.post_seq.fetch_add(1, Ordering::SeqCst);
        match self.posts.entry(post.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!(
                "Post {} already exists",
                post.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert((seq, post.clone()));
                Ok(post)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PostRecord>> {
        Ok(self.posts.get(id).map(|p| p.value().1.clone()))
    }

    async fn find_all(&self) -> StoreResult<Vec<PostRecord>> {
        let mut posts: Vec<(u64, PostRecord)> =
            self.posts.iter().map(|p| p.value().clone()).collect();
        posts.sort_by_key(|(seq, _)| *seq);
        Ok(posts.into_iter().map(|(_, post)| post).collect())
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<PostRecord>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.posts.get(id).map(|p| p.value().1.clone()))
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.posts.len() as u64)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.posts.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user(email: &str) -> UserRecord {
        UserRecord::new(email.to_string(), None, "$argon2id$stub".to_string())
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = MemoryStore::new();
        let created = UserRepository::insert(&store, user("a@example.com")).await.unwrap();

        let by_email = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = UserRepository::find_by_id(&store, &created.id).await.unwrap();
        assert_eq!(by_id, Some(created));
        assert!(store.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, user("a@example.com")).await.unwrap();

        let err = UserRepository::insert(&store, user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                UserRepository::insert(store.as_ref(), user("race@example.com")).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn test_push_post_appends() {
        let store = MemoryStore::new();
        let u = UserRepository::insert(&store, user("a@example.com")).await.unwrap();

        store.push_post(&u.id, "p1").await.unwrap();
        store.push_post(&u.id, "p2").await.unwrap();

        let reloaded = UserRepository::find_by_id(&store, &u.id).await.unwrap().unwrap();
        assert_eq!(reloaded.posts, vec!["p1".to_string(), "p2".to_string()]);

        let missing = store.push_post("nobody", "p3").await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_posts_listed_in_insertion_order() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let post = PostRecord::new(
                format!("Title {i}"),
                "Some content".to_string(),
                None,
                "creator".to_string(),
            );
            ids.push(PostRepository::insert(&store, post).await.unwrap().id);
        }

        let listed: Vec<String> = store.find_all().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(store.count().await.unwrap(), 5);

        let subset = PostRepository::find_many(&store, &[ids[3].clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].id, ids[3]);

        store.delete(&ids[0]).await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 4);
        assert_eq!(store.find_all().await.unwrap()[0].id, ids[1]);
    }
}
