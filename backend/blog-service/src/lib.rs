/// Blog Service Library
///
/// Backend for a small blogging app: accounts, posts with tags and images,
/// and comments embedded in posts. Records live in an external REST record
/// store; this service validates input, enforces ownership, and runs the
/// read-modify-write protocol the store's whole-record API requires.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for users, posts, comments
/// - `services`: Business logic layer and the post filtering pipeline
/// - `store`: Record store access (REST client and in-process store)
/// - `session`: Server-side session table
/// - `middleware`: HTTP middleware for session authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};

use std::sync::Arc;

use session::SessionStore;
use store::RecordStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_sessions(store, SessionStore::new())
    }

    pub fn with_sessions(store: Arc<dyn RecordStore>, sessions: SessionStore) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
        }
    }
}
