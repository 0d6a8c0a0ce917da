/// Comment handlers - HTTP endpoints for comment operations
///
/// Both endpoints answer with the full updated post.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::run_detached;
use crate::middleware::UserId;
use crate::models::{CreateCommentRequest, RecordId};
use crate::services::CommentService;
use crate::AppState;

/// Add a comment to a post
pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<String>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let post_id = RecordId::new(post_id.into_inner());
    let post = run_detached(async move {
        CommentService::new(store)
            .add_comment(&post_id, &user_id.0, &req.content)
            .await
    })
    .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Remove one of the signed-in user's comments
pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let (post_id, comment_id) = path.into_inner();
    let post_id = RecordId::new(post_id);
    let post = run_detached(async move {
        CommentService::new(store)
            .delete_comment(&post_id, &user_id.0, &comment_id)
            .await
    })
    .await?;

    Ok(HttpResponse::Ok().json(post))
}
