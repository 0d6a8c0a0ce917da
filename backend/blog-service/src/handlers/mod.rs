/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Auth: register, login, session restore and logout
/// - Users: profiles and per-user post listings
/// - Posts: filtered listing plus create, read, update, delete
/// - Comments: add and remove comments on a post
pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

// Re-export handler functions at module level
pub use auth::{login, logout, register, restore_session};
pub use comments::{create_comment, delete_comment};
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};
pub use users::{get_user, get_user_posts, update_profile};

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use std::future::Future;

use crate::error::{AppError, Result};
use crate::middleware::SessionAuthMiddleware;

/// Run a store write on its own task.
///
/// If the client goes away, actix drops the handler future but the spawned
/// task keeps going, so a write that already reached the store is never cut
/// off halfway. Its result is simply discarded.
pub(crate) async fn run_detached<T, F>(operation: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}

/// Upper bound on request bodies; post images travel inline as data URLs.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Body extractor settings. Decode failures render like any other `AppError`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req: &HttpRequest| match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                AppError::ValidationError("Request body is too large".to_string()).into()
            }
            other => AppError::ValidationError(other.to_string()).into(),
        })
}

/// Query string extractor settings.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::ValidationError(err.to_string()).into())
}

/// Mount every `/api/v1` route behind session auth.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .app_data(query_config())
            .wrap(SessionAuthMiddleware)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login)),
            )
            .service(
                web::resource("/session")
                    .route(web::get().to(restore_session))
                    .route(web::delete().to(logout)),
            )
            .service(
                web::scope("/users")
                    .route("/me", web::put().to(update_profile))
                    .route("/{user_id}", web::get().to(get_user))
                    .route("/{user_id}/posts", web::get().to(get_user_posts)),
            )
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(list_posts))
                            .route(web::post().to(create_post)),
                    )
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(get_post))
                            .route(web::put().to(update_post))
                            .route(web::delete().to(delete_post)),
                    )
                    .route("/{post_id}/comments", web::post().to(create_comment))
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::delete().to(delete_comment),
                    ),
            ),
    );
}
