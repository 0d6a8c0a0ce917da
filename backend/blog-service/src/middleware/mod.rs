/// HTTP middleware utilities for blog-service
///
/// Resolves `Authorization: Bearer <token>` against the server-side session
/// table. The middleware never rejects: a missing, malformed, expired or
/// unknown token leaves the request anonymous, so public reads keep working
/// for clients holding a token from before a restart. Handlers that need a
/// signed-in user take a [`UserId`] argument, which rejects with 401 when no
/// session was attached.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::debug;

use crate::error::AppError;
use crate::models::RecordId;
use crate::session::SessionToken;
use crate::AppState;

/// Signed-in user identifier stored in request extensions after auth.
#[derive(Debug, Clone)]
pub struct UserId(pub RecordId);

/// Session token of the current request, for logout and restore.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub SessionToken);

/// Actix middleware that resolves a Bearer token to a user id.
pub struct SessionAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            if let Some((user_id, token)) = resolve_session(&req) {
                req.extensions_mut().insert(UserId(user_id));
                req.extensions_mut().insert(CurrentSession(token));
            }

            service.call(req).await
        })
    }
}

/// User and token behind the request's bearer header, if it names a live session.
fn resolve_session(req: &ServiceRequest) -> Option<(RecordId, SessionToken)> {
    let header = req.headers().get("Authorization")?;

    let token = match header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::parse::<SessionToken>)
    {
        Some(Ok(token)) => token,
        _ => {
            debug!(path = req.path(), "Ignoring malformed Authorization header");
            return None;
        }
    };

    let state = req.app_data::<web::Data<AppState>>()?;
    let user_id = state.sessions.resolve(&token);
    if user_id.is_none() {
        debug!(path = req.path(), "Bearer token has no live session");
    }
    user_id.map(|id| (id, token))
}

fn sign_in_required() -> Error {
    AppError::Unauthorized("Sign in required".to_string()).into()
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(sign_in_required),
        )
    }
}

impl FromRequest for CurrentSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentSession>()
                .copied()
                .ok_or_else(sign_in_required),
        )
    }
}
