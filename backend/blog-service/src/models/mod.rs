/// Data models for blog-service
///
/// This module defines structures for:
/// - User: registered accounts (plaintext credentials, as held by the record store)
/// - Post: user-authored articles with tags and embedded comments
/// - Comment: entries embedded in a post's comment list
///
/// All records use the record store's camelCase JSON layout.
pub mod comment;
pub mod post;
pub mod user;

pub use comment::{Comment, CreateCommentRequest, MAX_COMMENT_LENGTH};
pub use post::{Category, NewPost, Post, PostRequest, TagError, Tags, MAX_TAGS};
pub use user::{
    LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User, UserProfile,
};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier assigned by the record store.
///
/// The store may hand out numeric or string ids; both are normalized to a
/// string so `1` and `"1"` address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => RecordId(text),
            RawId::Number(n) => RecordId(n.to_string()),
        })
    }
}
