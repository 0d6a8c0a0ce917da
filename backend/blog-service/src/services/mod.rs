/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Users: registration, login, profile edits
/// - Posts: listing, authoring, ownership checks
/// - Comments: read-modify-write of a post's embedded comment list
/// - Filter: search and category pipeline over loaded posts
pub mod comments;
pub mod filter;
pub mod posts;
pub mod users;

// Re-export commonly used services
pub use comments::CommentService;
pub use filter::{distinct_categories, ListingStatus, PostFeed, PostFilter, PostListing};
pub use posts::{PostService, UserPosts};
pub use users::UserService;
