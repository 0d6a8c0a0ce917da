//! Post filtering pipeline
//!
//! Derives the displayed post list from the full collection, a free-text
//! search term, and a category selector. The derivation is synchronous and
//! never touches the collection it reads from; [`PostFeed`] recomputes the
//! view every time one of its three inputs changes.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{Category, Post};

/// Search term plus category selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    search: String,
    needle: String,
    category: Option<Category>,
}

impl PostFilter {
    pub fn new(search: impl Into<String>, category: Option<Category>) -> Self {
        let search = search.into();
        let needle = search.to_lowercase();
        Self {
            search,
            needle,
            category,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// True when either input narrows the collection.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.category.is_some()
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category) = self.category {
            if post.category != category {
                return false;
            }
        }

        if self.needle.is_empty() {
            return true;
        }

        post.title.to_lowercase().contains(&self.needle)
            || post.content.to_lowercase().contains(&self.needle)
            || post
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&self.needle))
    }

    /// Matching posts, newest first. Equal timestamps keep collection order.
    pub fn apply<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        self.visible_indices(posts)
            .into_iter()
            .map(|i| &posts[i])
            .collect()
    }

    fn visible_indices(&self, posts: &[Post]) -> Vec<usize> {
        let mut indices: Vec<usize> = posts
            .iter()
            .enumerate()
            .filter(|(_, post)| self.matches(post))
            .map(|(i, _)| i)
            .collect();
        // sort_by is stable
        indices.sort_by(|&a, &b| posts[b].created_at.cmp(&posts[a].created_at));
        indices
    }
}

/// Distinct categories present across `posts`.
pub fn distinct_categories(posts: &[Post]) -> BTreeSet<Category> {
    posts.iter().map(|p| p.category).collect()
}

/// Lets the UI tell "nothing written yet" apart from "nothing matched".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Empty,
    NoMatches,
    Populated,
}

/// Serializable snapshot of a [`PostFeed`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListing {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub total: usize,
    pub status: ListingStatus,
    pub filters_active: bool,
}

/// Loaded posts together with the current filter and the derived view.
#[derive(Debug, Clone, Default)]
pub struct PostFeed {
    posts: Vec<Post>,
    filter: PostFilter,
    visible: Vec<usize>,
}

impl PostFeed {
    pub fn new(posts: Vec<Post>) -> Self {
        Self::with_filter(posts, PostFilter::default())
    }

    pub fn with_filter(posts: Vec<Post>, filter: PostFilter) -> Self {
        let mut feed = Self {
            posts,
            filter,
            visible: Vec::new(),
        };
        feed.recompute();
        feed
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn filter(&self) -> &PostFilter {
        &self.filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter = PostFilter::new(search, self.filter.category);
        self.recompute();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = category;
        self.recompute();
    }

    pub fn replace_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.filter = PostFilter::default();
        self.recompute();
    }

    pub fn view(&self) -> Vec<&Post> {
        self.visible.iter().map(|&i| &self.posts[i]).collect()
    }

    pub fn status(&self) -> ListingStatus {
        if self.posts.is_empty() {
            ListingStatus::Empty
        } else if self.visible.is_empty() {
            ListingStatus::NoMatches
        } else {
            ListingStatus::Populated
        }
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        distinct_categories(&self.posts)
    }

    pub fn listing(&self) -> PostListing {
        PostListing {
            posts: self.view().into_iter().cloned().collect(),
            categories: self.categories().into_iter().collect(),
            total: self.posts.len(),
            status: self.status(),
            filters_active: self.filter.is_active(),
        }
    }

    fn recompute(&mut self) {
        self.visible = self.filter.visible_indices(&self.posts);
    }
}
