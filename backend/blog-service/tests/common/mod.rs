#![allow(dead_code)]

use async_trait::async_trait;
use blog_service::models::{Category, NewPost, NewUser, Post, RecordId, Tags, User};
use blog_service::store::{RecordStore, StoreError, StoreResult};
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

pub fn user(id: &str, username: &str) -> User {
    User {
        id: RecordId::new(id),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "secret1".to_string(),
        bio: None,
    }
}

pub fn post(id: &str, author: &User, title: &str, minutes: i64) -> Post {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
    Post {
        id: RecordId::new(id),
        user_id: author.id.clone(),
        author: author.username.clone(),
        title: title.to_string(),
        category: Category::Technology,
        content: "A post body that is comfortably longer than fifty characters.".to_string(),
        image: None,
        tags: Tags::new(),
        created_at: at,
        updated_at: at,
        comments: vec![],
    }
}

/// Wraps a store and counts writes, optionally failing reads of posts or
/// parking each post read on a barrier.
pub struct InstrumentedStore {
    inner: Arc<dyn RecordStore>,
    writes: AtomicUsize,
    fail_post_reads: Option<StoreError>,
    read_barrier: Option<Arc<Barrier>>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            fail_post_reads: None,
            read_barrier: None,
        }
    }

    pub fn failing_post_reads(mut self, err: StoreError) -> Self {
        self.fail_post_reads = Some(err);
        self
    }

    /// Hold every `get_post` until `parties` reads have completed.
    pub fn with_read_barrier(mut self, parties: usize) -> Self {
        self.read_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for InstrumentedStore {
    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>> {
        self.inner.find_users_by_email(email).await
    }

    async fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        self.wrote();
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: &RecordId) -> StoreResult<User> {
        self.inner.get_user(id).await
    }

    async fn replace_user(&self, user: &User) -> StoreResult<User> {
        self.wrote();
        self.inner.replace_user(user).await
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.inner.list_posts().await
    }

    async fn list_posts_by_user(&self, user_id: &RecordId) -> StoreResult<Vec<Post>> {
        self.inner.list_posts_by_user(user_id).await
    }

    async fn get_post(&self, id: &RecordId) -> StoreResult<Post> {
        if let Some(err) = &self.fail_post_reads {
            return Err(err.clone());
        }
        let post = self.inner.get_post(id).await;
        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }
        post
    }

    async fn create_post(&self, post: &NewPost) -> StoreResult<Post> {
        self.wrote();
        self.inner.create_post(post).await
    }

    async fn replace_post(&self, post: &Post) -> StoreResult<Post> {
        self.wrote();
        self.inner.replace_post(post).await
    }

    async fn delete_post(&self, id: &RecordId) -> StoreResult<()> {
        self.wrote();
        self.inner.delete_post(id).await
    }
}
