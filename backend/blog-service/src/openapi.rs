/// OpenAPI documentation for Blog Service
use actix_web::{web, HttpResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "0.1.0",
        description = "Backend for the blogging app. Handles accounts and sessions, post authoring with tags and images, filtered post listings, and comments embedded in posts. Records are kept in an external REST record store.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8082", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "auth", description = "Registration, login, and sessions"),
        (name = "users", description = "Profiles and per-user post listings"),
        (name = "posts", description = "Post listing, creation, updates, and deletion"),
        (name = "comments", description = "Comment management on posts"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Session token returned by register or login"))
                    .build(),
            ),
        );
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

/// Serve the generated document. Expects `web::Data<utoipa::openapi::OpenApi>`.
pub async fn serve_openapi(
    doc: web::Data<utoipa::openapi::OpenApi>,
) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(doc.get_ref()).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}
