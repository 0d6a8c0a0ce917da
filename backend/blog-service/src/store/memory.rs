//! In-process record store
//!
//! Mirrors the REST store's semantics: sequential string ids, equality
//! filters, whole-record replace, 404 on unknown ids, and an optional fixed
//! delay before every call.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{NewPost, NewUser, Post, RecordId, User};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    posts: Vec<Post>,
    next_id: u64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId::new(self.next_id.to_string())
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    state: RwLock<MemoryState>,
    latency: Option<Duration>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`, like the mock server does.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = if latency.is_zero() { None } else { Some(latency) };
        self
    }

    /// Start from existing records. Ids keep counting past the largest numeric id.
    pub fn seeded(users: Vec<User>, posts: Vec<Post>) -> Self {
        let next_id = users
            .iter()
            .map(|u| &u.id)
            .chain(posts.iter().map(|p| &p.id))
            .filter_map(|id| id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            state: RwLock::new(MemoryState {
                users,
                posts,
                next_id,
            }),
            latency: None,
        }
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>> {
        self.delay().await;
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        self.delay().await;
        let mut state = self.state.write().await;
        let created = User {
            id: state.allocate_id(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            bio: user.bio.clone(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: &RecordId) -> StoreResult<User> {
        self.delay().await;
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {}", id)))
    }

    async fn replace_user(&self, user: &User) -> StoreResult<User> {
        self.delay().await;
        let mut state = self.state.write().await;
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::NotFound(format!("User {}", user.id)))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.delay().await;
        Ok(self.state.read().await.posts.clone())
    }

    async fn list_posts_by_user(&self, user_id: &RecordId) -> StoreResult<Vec<Post>> {
        self.delay().await;
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: &RecordId) -> StoreResult<Post> {
        self.delay().await;
        let state = self.state.read().await;
        state
            .posts
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Post {}", id)))
    }

    async fn create_post(&self, post: &NewPost) -> StoreResult<Post> {
        self.delay().await;
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = post.clone().into_post(id);
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn replace_post(&self, post: &Post) -> StoreResult<Post> {
        self.delay().await;
        let mut state = self.state.write().await;
        let slot = state
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| StoreError::NotFound(format!("Post {}", post.id)))?;
        *slot = post.clone();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: &RecordId) -> StoreResult<()> {
        self.delay().await;
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|p| &p.id != id);
        if state.posts.len() == before {
            return Err(StoreError::NotFound(format!("Post {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Tags};
    use chrono::Utc;

    fn draft(title: &str) -> NewPost {
        let now = Utc::now();
        NewPost {
            user_id: RecordId::new("1"),
            author: "ada".into(),
            title: title.into(),
            category: Category::Technology,
            content: "x".repeat(60),
            image: None,
            tags: Tags::new(),
            created_at: now,
            updated_at: now,
            comments: vec![],
        }
    }

    #[tokio::test]
    async fn created_post_round_trips_except_id() {
        let store = InMemoryRecordStore::new();
        let post = draft("First");
        let created = store.create_post(&post).await.unwrap();
        let fetched = store.get_post(&created.id).await.unwrap();
        assert_eq!(fetched, post.into_post(created.id.clone()));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = InMemoryRecordStore::new();
        let missing = RecordId::new("99");
        assert!(matches!(store.get_post(&missing).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_post(&missing).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.get_user(&missing).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn seeded_store_continues_numbering() {
        let post = draft("Seed").into_post(RecordId::new("7"));
        let store = InMemoryRecordStore::seeded(vec![], vec![post]);
        let created = store.create_post(&draft("Next")).await.unwrap();
        assert_eq!(created.id, RecordId::new("8"));
        assert_eq!(store.post_count().await, 2);
    }
}
