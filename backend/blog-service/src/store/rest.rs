//! HTTP client for the record store
//!
//! Each call is a single request with a fixed transport deadline. Nothing is
//! retried: a timeout surfaces as [`StoreError::Transport`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::{RecordStore, StoreError, StoreResult};
use crate::metrics::store::{STORE_REQUEST_DURATION_SECONDS, STORE_REQUEST_TOTAL};
use crate::models::{NewPost, NewUser, Post, RecordId, User};

pub struct RestRecordStore {
    client: Client,
    base_url: String,
}

impl RestRecordStore {
    /// Create a store client rooted at `base_url` (e.g. `http://localhost:3001`).
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        what: String,
        request: RequestBuilder,
    ) -> StoreResult<T> {
        let start = Instant::now();
        let result = match self.dispatch(what, request).await {
            Ok(response) => response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    StoreError::Transport(e.to_string())
                } else {
                    StoreError::Decode(e.to_string())
                }
            }),
            Err(e) => Err(e),
        };
        record(operation, start, &result);
        result
    }

    /// Fetch a collection, decoding each record on its own. Records that do
    /// not match `T` are logged and skipped.
    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        what: String,
        request: RequestBuilder,
    ) -> StoreResult<Vec<T>> {
        let raw: Vec<serde_json::Value> = self.fetch(operation, what.clone(), request).await?;
        Ok(decode_records(&what, raw))
    }

    async fn execute(
        &self,
        operation: &'static str,
        what: String,
        request: RequestBuilder,
    ) -> StoreResult<()> {
        let start = Instant::now();
        let result = self.dispatch(what, request).await.map(|_| ());
        record(operation, start, &result);
        result
    }

    async fn dispatch(&self, what: String, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!(record = %what, "Record store request failed: {}", e);
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(what));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }
}

/// Pull `error` out of a JSON error body, falling back to a generic message.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string())
}

fn decode_records<T: DeserializeOwned>(what: &str, raw: Vec<serde_json::Value>) -> Vec<T> {
    raw.into_iter()
        .filter_map(|value| {
            let id = value.get("id").cloned().unwrap_or_default();
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection = what, id = %id, "Skipping malformed record: {}", e);
                    None
                }
            }
        })
        .collect()
}

fn record<T>(operation: &'static str, start: Instant, result: &StoreResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(StoreError::NotFound(_)) => "not_found",
        Err(StoreError::Transport(_)) => "transport",
        Err(StoreError::Status { .. }) => "status",
        Err(StoreError::Decode(_)) => "decode",
    };

    STORE_REQUEST_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    STORE_REQUEST_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());

    debug!(operation, outcome, elapsed_ms = start.elapsed().as_millis() as u64, "store call");
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>> {
        let request = self.client.get(self.url("users")).query(&[("email", email)]);
        self.fetch_collection("find_users_by_email", "users".to_string(), request)
            .await
    }

    async fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        let request = self.client.post(self.url("users")).json(user);
        self.fetch("create_user", "users".to_string(), request).await
    }

    async fn get_user(&self, id: &RecordId) -> StoreResult<User> {
        let request = self.client.get(self.url(&format!("users/{}", id)));
        self.fetch("get_user", format!("User {}", id), request).await
    }

    async fn replace_user(&self, user: &User) -> StoreResult<User> {
        let request = self
            .client
            .put(self.url(&format!("users/{}", user.id)))
            .json(user);
        self.fetch("replace_user", format!("User {}", user.id), request)
            .await
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let request = self.client.get(self.url("posts"));
        self.fetch_collection("list_posts", "posts".to_string(), request)
            .await
    }

    async fn list_posts_by_user(&self, user_id: &RecordId) -> StoreResult<Vec<Post>> {
        let request = self
            .client
            .get(self.url("posts"))
            .query(&[("userId", user_id.as_str())]);
        self.fetch_collection("list_posts_by_user", "posts".to_string(), request)
            .await
    }

    async fn get_post(&self, id: &RecordId) -> StoreResult<Post> {
        let request = self.client.get(self.url(&format!("posts/{}", id)));
        self.fetch("get_post", format!("Post {}", id), request).await
    }

    async fn create_post(&self, post: &NewPost) -> StoreResult<Post> {
        let request = self.client.post(self.url("posts")).json(post);
        self.fetch("create_post", "posts".to_string(), request).await
    }

    async fn replace_post(&self, post: &Post) -> StoreResult<Post> {
        let request = self
            .client
            .put(self.url(&format!("posts/{}", post.id)))
            .json(post);
        self.fetch("replace_post", format!("Post {}", post.id), request)
            .await
    }

    async fn delete_post(&self, id: &RecordId) -> StoreResult<()> {
        let request = self.client.delete(self.url(&format!("posts/{}", id)));
        self.execute("delete_post", format!("Post {}", id), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_client_creation() {
        let store = RestRecordStore::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(store.base_url(), "http://localhost:3001");
        assert_eq!(store.url("/posts/1"), "http://localhost:3001/posts/1");
    }

    #[test]
    fn decode_records_skips_bad_entries() {
        let raw = vec![
            serde_json::json!({"id": 1, "username": "ada", "email": "ada@example.com", "password": "x"}),
            serde_json::json!({"id": 2, "username": "bob"}),
        ];
        let users: Vec<User> = decode_records("users", raw);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, RecordId::new("1"));
    }

    #[test]
    fn error_message_prefers_body_error_field() {
        assert_eq!(error_message(r#"{"error":"Email taken"}"#), "Email taken");
        assert_eq!(error_message("<html>oops</html>"), "Request failed");
    }
}
