/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::handlers::run_detached;
use crate::middleware::UserId;
use crate::models::{Category, PostRequest, RecordId};
use crate::services::{PostFilter, PostService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub search: String,
    /// Empty means all categories
    #[serde(default)]
    pub category: String,
}

impl ListPostsQuery {
    fn into_filter(self) -> Result<PostFilter> {
        let category = if self.category.trim().is_empty() {
            None
        } else {
            Some(
                self.category
                    .parse::<Category>()
                    .map_err(AppError::ValidationError)?,
            )
        };
        Ok(PostFilter::new(self.search, category))
    }
}

/// List posts matching the search term and category
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let filter = query.into_inner().into_filter()?;
    let service = PostService::new(state.store.clone());
    let listing = service.list_posts(filter).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let post = run_detached(async move {
        PostService::new(store)
            .create_post(&user_id.0, req.into_inner())
            .await
    })
    .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post with its comments
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.get_post(&RecordId::new(post_id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Edit a post owned by the signed-in user
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<String>,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let post_id = RecordId::new(post_id.into_inner());
    let post = run_detached(async move {
        PostService::new(store)
            .update_post(&user_id.0, &post_id, req.into_inner())
            .await
    })
    .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post owned by the signed-in user
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let post_id = RecordId::new(post_id.into_inner());
    run_detached(async move { PostService::new(store).delete_post(&user_id.0, &post_id).await })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
