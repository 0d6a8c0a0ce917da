/// Record store access layer
///
/// The record store is a generic REST-over-JSON service exposing two
/// collections, `users` and `posts`. It only offers whole-record reads and
/// replaces: there is no partial update, no array append, and no version
/// check. Everything above this module is written against [`RecordStore`].
pub mod memory;
pub mod rest;

pub use memory::InMemoryRecordStore;
pub use rest::RestRecordStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewPost, NewUser, Post, RecordId, User};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Uniform failure shape for every store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store answered 404
    #[error("{0} not found")]
    NotFound(String),

    /// Connection refused, DNS failure, or the transport deadline passed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other non-success status
    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body did not match the expected record shape
    #[error("Malformed store response: {0}")]
    Decode(String),
}

/// Collection operations offered by the record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `GET /users?email=<e>`: zero or one user
    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>>;

    /// `POST /users`
    async fn create_user(&self, user: &NewUser) -> StoreResult<User>;

    /// `GET /users/:id`
    async fn get_user(&self, id: &RecordId) -> StoreResult<User>;

    /// `PUT /users/:id` with the full record
    async fn replace_user(&self, user: &User) -> StoreResult<User>;

    /// `GET /posts`
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    /// `GET /posts?userId=<id>`
    async fn list_posts_by_user(&self, user_id: &RecordId) -> StoreResult<Vec<Post>>;

    /// `GET /posts/:id`
    async fn get_post(&self, id: &RecordId) -> StoreResult<Post>;

    /// `POST /posts`
    async fn create_post(&self, post: &NewPost) -> StoreResult<Post>;

    /// `PUT /posts/:id` with the full record, comment list included
    async fn replace_post(&self, post: &Post) -> StoreResult<Post>;

    /// `DELETE /posts/:id`
    async fn delete_post(&self, id: &RecordId) -> StoreResult<()>;
}
