use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::config::{Config, StoreBackend};
use blog_service::handlers;
use blog_service::openapi::{serve_openapi, ApiDoc};
use blog_service::store::{InMemoryRecordStore, RecordStore, RestRecordStore};
use blog_service::session::SessionStore;
use blog_service::AppState;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use utoipa::OpenApi;

async fn health_summary(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION"),
        "store": config.store.backend,
    }))
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn build_store(config: &Config) -> io::Result<Arc<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::Rest => {
            let store = RestRecordStore::new(&config.store.base_url, config.store.timeout())
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            tracing::info!(
                base_url = %store.base_url(),
                timeout_ms = config.store.timeout_ms,
                "Using REST record store"
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::info!(
                latency_ms = config.store.latency_ms,
                "Using in-memory record store"
            );
            Ok(Arc::new(
                InMemoryRecordStore::new().with_latency(config.store.latency()),
            ))
        }
    }
}

/// Blog Service
///
/// Backend for the blogging app.
///
/// # Routes
///
/// - `/api/v1/auth/*` - Register and log in
/// - `/api/v1/session` - Restore or end the current session
/// - `/api/v1/users/*` - Profiles and per-user post listings
/// - `/api/v1/posts/*` - Filtered listing, post CRUD, comments
///
/// Runs on port 8082 (configurable via BLOG_SERVICE_PORT env var).
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Support container healthchecks via CLI subcommand
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" || cmd == "healthcheck-http" {
                let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8082".into());
                let url = format!("http://127.0.0.1:{}/api/v1/health", port);
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    dotenvy::dotenv().ok();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing; JSON lines in production
    let fmt_layer = if config.is_production() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,blog_service=debug".into()),
        )
        .with(fmt_layer)
        .init();

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config)?;
    let sessions = SessionStore::with_ttl(config.session.ttl());
    let state = web::Data::new(AppState::with_sessions(store, sessions));
    let config_data = web::Data::new(config.clone());
    let openapi_doc = web::Data::new(ApiDoc::openapi());

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_config.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(config_data.clone())
            .app_data(openapi_doc.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(ApiDoc::openapi_json_path(), web::get().to(serve_openapi))
            .route("/metrics", web::get().to(blog_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure)
    })
    .bind(&http_bind_address)?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            return match result {
                Ok(result) => result,
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            };
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
        }
    }

    server_handle.stop(true).await;
    match server_task.await {
        Ok(result) => result,
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}
