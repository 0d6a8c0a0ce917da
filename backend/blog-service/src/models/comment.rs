use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordId;

/// Longest comment body accepted by the comment form.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Comment embedded in a post. The parent post is implied by where it lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: RecordId,
    /// Username at the time the comment was written.
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: RecordId, username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            username: username.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Body of the comment form. Trimmed and length-checked by the comment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}
