use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use super::{Comment, RecordId};

/// Upper bound on tags per post.
pub const MAX_TAGS: usize = 5;

/// Fixed set of post categories offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Travel,
    Food,
    Fashion,
    Lifestyle,
    Health,
    Business,
    Art,
    Education,
    Personal,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Technology,
        Category::Travel,
        Category::Food,
        Category::Fashion,
        Category::Lifestyle,
        Category::Health,
        Category::Business,
        Category::Art,
        Category::Education,
        Category::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::Fashion => "Fashion",
            Category::Lifestyle => "Lifestyle",
            Category::Health => "Health",
            Category::Business => "Business",
            Category::Art => "Art",
            Category::Education => "Education",
            Category::Personal => "Personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category '{}'", wanted))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Tags cannot be empty")]
    Empty,
    #[error("Duplicate tag '{0}'")]
    Duplicate(String),
    #[error("A post can have at most {} tags", MAX_TAGS)]
    TooMany,
}

/// Ordered, duplicate-free set of at most [`MAX_TAGS`] non-empty tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tag, keeping insertion order.
    pub fn push(&mut self, tag: impl AsRef<str>) -> Result<(), TagError> {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return Err(TagError::Empty);
        }
        if self.0.iter().any(|t| t == tag) {
            return Err(TagError::Duplicate(tag.to_string()));
        }
        if self.0.len() >= MAX_TAGS {
            return Err(TagError::TooMany);
        }
        self.0.push(tag.to_string());
        Ok(())
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for Tags {
    type Error = TagError;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        let mut tags = Tags::new();
        for tag in raw {
            tags.push(tag)?;
        }
        Ok(tags)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// Post record with its embedded comment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: RecordId,
    pub user_id: RecordId,
    pub author: String,
    pub title: String,
    pub category: Category,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Post record before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: RecordId,
    pub author: String,
    pub title: String,
    pub category: Category,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub tags: Tags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

impl NewPost {
    pub fn into_post(self, id: RecordId) -> Post {
        Post {
            id,
            user_id: self.user_id,
            author: self.author,
            title: self.title,
            category: self.category,
            content: self.content,
            image: self.image,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
            comments: self.comments,
        }
    }
}

/// Body of the create and edit forms.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Title must be between 3 and 100 characters"
    ))]
    pub title: String,
    pub category: Category,
    #[validate(length(min = 50, message = "Content must be at least 50 characters"))]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_keep_order_and_reject_duplicates() {
        let mut tags = Tags::new();
        tags.push("Rust").unwrap();
        tags.push("WebDev").unwrap();
        assert_eq!(tags.push("Rust"), Err(TagError::Duplicate("Rust".into())));
        assert_eq!(tags.push("   "), Err(TagError::Empty));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["Rust", "WebDev"]);
    }

    #[test]
    fn tags_cap_at_five() {
        let raw: Vec<String> = (1..=5).map(|i| format!("t{i}")).collect();
        let mut tags = Tags::try_from(raw).unwrap();
        assert_eq!(tags.push("t6"), Err(TagError::TooMany));
        assert!(tags.remove("t1"));
        assert!(tags.push("t6").is_ok());
        assert_eq!(tags.len(), MAX_TAGS);
    }

    #[test]
    fn post_decodes_store_record_without_optional_arrays() {
        let json = serde_json::json!({
            "id": 1,
            "userId": "4",
            "author": "ada",
            "title": "Hello World",
            "category": "Technology",
            "content": "body",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:00:00.000Z"
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.id, RecordId::new("1"));
        assert!(post.tags.is_empty());
        assert!(post.comments.is_empty());
        assert!(post.image.is_none());
    }

    #[test]
    fn post_rejects_invalid_tag_sets() {
        let json = serde_json::json!({
            "id": "1",
            "userId": "4",
            "author": "ada",
            "title": "Hello",
            "category": "Travel",
            "content": "body",
            "tags": ["a", "a"],
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        });
        assert!(serde_json::from_value::<Post>(json).is_err());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("travel".parse::<Category>(), Ok(Category::Travel));
        assert!("Gardening".parse::<Category>().is_err());
    }
}
