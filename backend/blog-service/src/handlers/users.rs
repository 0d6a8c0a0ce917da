/// User handlers - profile reads and edits
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::run_detached;
use crate::middleware::UserId;
use crate::models::{RecordId, UpdateProfileRequest, UserProfile};
use crate::services::{PostService, UserService};
use crate::AppState;

/// Get a user's public profile
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.get_user(&RecordId::new(user_id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

/// Edit the signed-in user's profile
pub async fn update_profile(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let user = run_detached(async move {
        UserService::new(store)
            .update_profile(&user_id.0, req.into_inner())
            .await
    })
    .await?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

/// List a user's posts with post and comment counts
pub async fn get_user_posts(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let summary = service
        .get_user_posts(&RecordId::new(user_id.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}
