/// Post service - handles post listing, authoring, and ownership checks
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{NewPost, Post, PostRequest, RecordId, Tags};
use crate::services::filter::{PostFeed, PostFilter, PostListing};
use crate::store::RecordStore;

/// A user's posts plus the counters shown on their profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosts {
    pub posts: Vec<Post>,
    pub post_count: usize,
    pub comment_count: usize,
}

pub struct PostService {
    store: Arc<dyn RecordStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Load every post and run it through `filter`.
    pub async fn list_posts(&self, filter: PostFilter) -> Result<PostListing> {
        debug!(
            search = filter.search(),
            category = ?filter.category(),
            "Listing posts"
        );
        let posts = self.store.list_posts().await?;
        Ok(PostFeed::with_filter(posts, filter).listing())
    }

    pub async fn get_post(&self, post_id: &RecordId) -> Result<Post> {
        Ok(self.store.get_post(post_id).await?)
    }

    /// Posts authored by `user_id`, newest first.
    pub async fn get_user_posts(&self, user_id: &RecordId) -> Result<UserPosts> {
        let posts = self.store.list_posts_by_user(user_id).await?;
        let posts: Vec<Post> = PostFilter::default()
            .apply(&posts)
            .into_iter()
            .cloned()
            .collect();

        let comment_count = posts.iter().map(|p| p.comments.len()).sum();
        Ok(UserPosts {
            post_count: posts.len(),
            comment_count,
            posts,
        })
    }

    /// Create a post authored by `user_id`.
    pub async fn create_post(&self, user_id: &RecordId, req: PostRequest) -> Result<Post> {
        let tags = validate_post(&req)?;
        let author = self.store.get_user(user_id).await?;

        let now = Utc::now();
        let post = self
            .store
            .create_post(&NewPost {
                user_id: author.id,
                author: author.username,
                title: req.title,
                category: req.category,
                content: req.content,
                image: req.image,
                tags,
                created_at: now,
                updated_at: now,
                comments: Vec::new(),
            })
            .await?;

        info!(post_id = %post.id, user_id = %user_id, "Post created");
        Ok(post)
    }

    /// Replace the editable fields of a post owned by `user_id`.
    ///
    /// Comments are carried over from the copy fetched here, so a comment
    /// landing between that fetch and the replace is lost.
    pub async fn update_post(
        &self,
        user_id: &RecordId,
        post_id: &RecordId,
        req: PostRequest,
    ) -> Result<Post> {
        let tags = validate_post(&req)?;
        let current = self.owned_post(user_id, post_id, "edit").await?;

        let updated = Post {
            title: req.title,
            category: req.category,
            content: req.content,
            image: req.image,
            tags,
            updated_at: Utc::now(),
            ..current
        };

        Ok(self.store.replace_post(&updated).await?)
    }

    pub async fn delete_post(&self, user_id: &RecordId, post_id: &RecordId) -> Result<()> {
        self.owned_post(user_id, post_id, "delete").await?;
        self.store.delete_post(post_id).await?;
        info!(post_id = %post_id, user_id = %user_id, "Post deleted");
        Ok(())
    }

    async fn owned_post(&self, user_id: &RecordId, post_id: &RecordId, verb: &str) -> Result<Post> {
        let post = self.store.get_post(post_id).await?;
        if &post.user_id != user_id {
            return Err(AppError::Forbidden(format!(
                "You are not authorized to {} this post",
                verb
            )));
        }
        Ok(post)
    }
}

/// Check form rules and build the tag set.
fn validate_post(req: &PostRequest) -> Result<Tags> {
    req.validate()?;

    if let Some(image) = &req.image {
        if !image.starts_with("data:image/") {
            return Err(AppError::ValidationError(
                "Image must be an embedded image data URL".to_string(),
            ));
        }
    }

    Tags::try_from(req.tags.clone()).map_err(|e| AppError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewUser, User};
    use crate::services::filter::ListingStatus;
    use crate::store::InMemoryRecordStore;

    async fn setup() -> (Arc<InMemoryRecordStore>, User) {
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
        (store, user)
    }

    fn request(title: &str) -> PostRequest {
        PostRequest {
            title: title.into(),
            category: Category::Technology,
            content: "A long enough body to clear the fifty character minimum.".into(),
            image: None,
            tags: vec!["rust".into(), " async ".into()],
        }
    }

    #[tokio::test]
    async fn create_post_snapshots_author() {
        let (store, user) = setup().await;
        let service = PostService::new(store);

        let post = service.create_post(&user.id, request("Hello")).await.unwrap();
        assert_eq!(post.author, "ada");
        assert_eq!(post.user_id, user.id);
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(post.tags.iter().collect::<Vec<_>>(), vec!["rust", "async"]);
        assert!(post.comments.is_empty());
    }

    #[tokio::test]
    async fn create_post_validates_form() {
        let (store, user) = setup().await;
        let service = PostService::new(store.clone());

        let mut short = request("Hello");
        short.content = "too short".into();
        assert!(matches!(
            service.create_post(&user.id, short).await,
            Err(AppError::ValidationError(_))
        ));

        let mut dup_tags = request("Hello");
        dup_tags.tags = vec!["a".into(), "a".into()];
        assert!(matches!(
            service.create_post(&user.id, dup_tags).await,
            Err(AppError::ValidationError(_))
        ));

        let mut linked = request("Hello");
        linked.image = Some("https://example.com/cat.png".into());
        assert!(matches!(
            service.create_post(&user.id, linked).await,
            Err(AppError::ValidationError(_))
        ));

        assert_eq!(store.post_count().await, 0);
    }

    #[tokio::test]
    async fn only_owner_can_edit_or_delete() {
        let (store, user) = setup().await;
        let service = PostService::new(store.clone());
        let post = service.create_post(&user.id, request("Hello")).await.unwrap();
        let stranger = RecordId::new("999");

        let err = service
            .update_post(&stranger, &post.id, request("Hijacked"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.delete_post(&stranger, &post.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(store.post_count().await, 1);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_author() {
        let (store, user) = setup().await;
        let service = PostService::new(store.clone());
        let post = service.create_post(&user.id, request("Hello")).await.unwrap();

        let updated = service
            .update_post(&user.id, &post.id, request("Hello again"))
            .await
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "Hello again");
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(updated.author, post.author);
    }

    #[tokio::test]
    async fn listing_applies_filter() {
        let (store, user) = setup().await;
        let service = PostService::new(store.clone());

        assert_eq!(
            service.list_posts(PostFilter::default()).await.unwrap().status,
            ListingStatus::Empty
        );

        service.create_post(&user.id, request("Hello")).await.unwrap();
        service.create_post(&user.id, request("Tokio tips")).await.unwrap();

        let listing = service
            .list_posts(PostFilter::new("tokio", None))
            .await
            .unwrap();
        assert_eq!(listing.posts.len(), 1);
        assert_eq!(listing.total, 2);

        let none = service
            .list_posts(PostFilter::new("", Some(Category::Food)))
            .await
            .unwrap();
        assert_eq!(none.status, ListingStatus::NoMatches);
    }

    #[tokio::test]
    async fn user_posts_count_comments() {
        let (store, user) = setup().await;
        let service = PostService::new(store.clone());
        let post = service.create_post(&user.id, request("Hello")).await.unwrap();

        let mut with_comment = post.clone();
        with_comment
            .comments
            .push(crate::models::Comment::new(user.id.clone(), "ada", "hi"));
        store.replace_post(&with_comment).await.unwrap();

        let summary = service.get_user_posts(&user.id).await.unwrap();
        assert_eq!(summary.post_count, 1);
        assert_eq!(summary.comment_count, 1);

        let empty = service.get_user_posts(&RecordId::new("999")).await.unwrap();
        assert_eq!(empty.post_count, 0);
    }
}
