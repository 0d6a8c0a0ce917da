/// Auth handlers - account creation and server-side sessions
use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::handlers::run_detached;
use crate::middleware::{CurrentSession, UserId};
use crate::models::{LoginRequest, RegisterRequest, UserProfile};
use crate::services::UserService;
use crate::session::SessionToken;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: SessionToken,
    pub user: UserProfile,
}

/// Create an account and sign it in
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let store = state.store.clone();
    let user =
        run_detached(async move { UserService::new(store).register(req.into_inner()).await })
            .await?;

    let token = state.sessions.create(user.id.clone());
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Check credentials and open a session
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.login(req.into_inner()).await?;

    let token = state.sessions.create(user.id.clone());
    info!(user_id = %user.id, "User signed in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Re-fetch the signed-in user. A failed fetch ends the session.
pub async fn restore_session(
    state: web::Data<AppState>,
    user_id: UserId,
    session: CurrentSession,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    match service.get_user(&user_id.0).await {
        Ok(user) => Ok(HttpResponse::Ok().json(UserProfile::from(user))),
        Err(e) => {
            warn!(user_id = %user_id.0, "Session restore failed, signing out: {}", e);
            state.sessions.clear(&session.0);
            Err(e)
        }
    }
}

/// End the current session
pub async fn logout(state: web::Data<AppState>, session: CurrentSession) -> HttpResponse {
    state.sessions.clear(&session.0);
    HttpResponse::NoContent().finish()
}
