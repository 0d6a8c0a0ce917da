/// Comment service - adds and removes comments embedded in a post record
///
/// The record store cannot append to an array or update part of a record, so
/// every comment change is a read-modify-write of the whole post:
///
/// 1. fetch the current post
/// 2. derive the new comment list from the fetched copy
/// 3. replace the post with the derived record
///
/// There is no version check between steps 1 and 3. Two concurrent mutations
/// on the same post can each read the same snapshot, and whichever replace
/// lands last wins; the other change is silently lost.
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, CommentAction, Result};
use crate::metrics::comments::COMMENT_MUTATIONS_TOTAL;
use crate::models::{Comment, Post, RecordId, MAX_COMMENT_LENGTH};
use crate::store::RecordStore;

pub struct CommentService {
    store: Arc<dyn RecordStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Add a comment written by `user_id` to a post.
    ///
    /// The body is trimmed first; empty or over-long bodies are rejected
    /// before any store call.
    pub async fn add_comment(
        &self,
        post_id: &RecordId,
        user_id: &RecordId,
        content: &str,
    ) -> Result<Post> {
        let content = validate_comment(content)?;

        let author = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| failed(CommentAction::Add, e.into()))?;

        let comment = Comment::new(author.id, author.username, content);
        self.append_comment(post_id, comment).await
    }

    /// Append an already-built comment to the stored post.
    pub async fn append_comment(&self, post_id: &RecordId, comment: Comment) -> Result<Post> {
        let mut post = self
            .store
            .get_post(post_id)
            .await
            .map_err(|e| failed(CommentAction::Add, e.into()))?;

        let comment_id = comment.id.clone();
        post.comments.push(comment);

        let updated = self
            .store
            .replace_post(&post)
            .await
            .map_err(|e| failed(CommentAction::Add, e.into()))?;

        COMMENT_MUTATIONS_TOTAL
            .with_label_values(&["add", "ok"])
            .inc();
        info!(post_id = %post_id, comment_id = %comment_id, "Comment added");

        Ok(updated)
    }

    /// Remove a comment from a post on behalf of `user_id`.
    ///
    /// Only the comment's author may remove it. An id that is not on the
    /// post leaves it untouched and skips the write.
    pub async fn delete_comment(
        &self,
        post_id: &RecordId,
        user_id: &RecordId,
        comment_id: &str,
    ) -> Result<Post> {
        let mut post = self
            .store
            .get_post(post_id)
            .await
            .map_err(|e| failed(CommentAction::Delete, e.into()))?;

        let author = post
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| c.user_id.clone());

        let Some(author) = author else {
            COMMENT_MUTATIONS_TOTAL
                .with_label_values(&["delete", "noop"])
                .inc();
            return Ok(post);
        };

        if &author != user_id {
            return Err(failed(
                CommentAction::Delete,
                AppError::Forbidden("Only the author can delete this comment".to_string()),
            ));
        }

        post.comments.retain(|c| c.id != comment_id);

        let updated = self
            .store
            .replace_post(&post)
            .await
            .map_err(|e| failed(CommentAction::Delete, e.into()))?;

        COMMENT_MUTATIONS_TOTAL
            .with_label_values(&["delete", "ok"])
            .inc();
        info!(post_id = %post_id, comment_id = %comment_id, "Comment deleted");

        Ok(updated)
    }
}

fn validate_comment(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "Comment cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

fn failed(action: CommentAction, cause: AppError) -> AppError {
    warn!(action = action.as_str(), "Comment mutation failed: {}", cause);
    COMMENT_MUTATIONS_TOTAL
        .with_label_values(&[action.as_str(), "error"])
        .inc();
    AppError::comment_failed(action, cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewPost, NewUser, Tags, User};
    use crate::store::InMemoryRecordStore;
    use actix_web::{http::StatusCode, ResponseError};
    use chrono::Utc;

    async fn setup() -> (Arc<InMemoryRecordStore>, User, Post) {
        let store = Arc::new(InMemoryRecordStore::new());
        let user = store
            .create_user(&NewUser {
                username: "ada".into(),
                email: "ada@example.com".into(),
                password: "secret1".into(),
                bio: None,
            })
            .await
            .unwrap();
        let now = Utc::now();
        let post = store
            .create_post(&NewPost {
                user_id: user.id.clone(),
                author: user.username.clone(),
                title: "Hello World".into(),
                category: Category::Technology,
                content: "x".repeat(60),
                image: None,
                tags: Tags::new(),
                created_at: now,
                updated_at: now,
                comments: vec![],
            })
            .await
            .unwrap();
        (store, user, post)
    }

    #[tokio::test]
    async fn add_comment_appends_and_persists() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let updated = service
            .add_comment(&post.id, &user.id, "  Nice post  ")
            .await
            .unwrap();

        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].content, "Nice post");
        assert_eq!(updated.comments[0].username, "ada");
        assert_eq!(store.get_post(&post.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn add_comment_keeps_everything_else() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let comment = Comment::new(user.id.clone(), "ada", "first");
        let updated = service.append_comment(&post.id, comment.clone()).await.unwrap();

        let mut expected = post.clone();
        expected.comments.push(comment);
        assert_eq!(updated, expected);
    }

    #[tokio::test]
    async fn empty_comment_is_rejected_before_the_store() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let err = service.add_comment(&post.id, &user.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let too_long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let err = service.add_comment(&post.id, &user.id, &too_long).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert!(store.get_post(&post.id).await.unwrap().comments.is_empty());
    }

    #[tokio::test]
    async fn add_to_missing_post_fails_with_not_found_cause() {
        let (store, user, _) = setup().await;
        let service = CommentService::new(store);

        let err = service
            .add_comment(&RecordId::new("42"), &user.id, "hi")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().starts_with("Failed to add comment"));
    }

    #[tokio::test]
    async fn delete_comment_removes_only_that_comment() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let first = Comment::new(user.id.clone(), "ada", "first");
        let second = Comment::new(user.id.clone(), "ada", "second");
        service.append_comment(&post.id, first.clone()).await.unwrap();
        service.append_comment(&post.id, second.clone()).await.unwrap();

        let updated = service
            .delete_comment(&post.id, &user.id, &first.id)
            .await
            .unwrap();

        assert_eq!(updated.comments, vec![second]);
        assert_eq!(store.get_post(&post.id).await.unwrap().comments.len(), 1);
    }

    #[tokio::test]
    async fn deleting_unknown_comment_is_a_noop() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let unchanged = service
            .delete_comment(&post.id, &user.id, "does-not-exist")
            .await
            .unwrap();

        assert_eq!(unchanged, post);
    }

    #[tokio::test]
    async fn only_author_can_delete_comment() {
        let (store, user, post) = setup().await;
        let service = CommentService::new(store.clone());

        let comment = Comment::new(user.id.clone(), "ada", "mine");
        service.append_comment(&post.id, comment.clone()).await.unwrap();

        let err = service
            .delete_comment(&post.id, &RecordId::new("999"), &comment.id)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(err.to_string().starts_with("Failed to delete comment"));
        assert_eq!(store.get_post(&post.id).await.unwrap().comments.len(), 1);
    }
}
