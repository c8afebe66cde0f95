//! # scifun-rest - Quiz Platform REST API
//!
//! This crate provides the admin-facing REST API for the SciFun quiz
//! platform: subjects, topics, quizzes, questions, video lessons, user
//! management, and quiz-result listings. Writes go to the primary document
//! store first, then a denormalized mirror of the searchable entities is
//! synchronized into the search index.
//!
//! ## Backend Support
//!
//! Backends are configured through feature flags; without them, in-memory
//! backends are used (great for development and tests):
//!
//! - `mongodb` - MongoDB primary store
//! - `elasticsearch` - Elasticsearch search index
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use scifun_persistence::index::MemoryIndex;
//! use scifun_persistence::store::MemoryStore;
//! use scifun_rest::{ServerConfig, create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let index = Arc::new(MemoryIndex::new());
//!     let app = create_app(store, index);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Response Envelope
//!
//! Every endpoint answers HTTP 200 and carries the real outcome in the
//! body: `{ "status": 200 | 400 | 500, "message": ..., "data": ... }`.
//! Auth rejections add `"success": false`; login adds a top-level
//! `"token"`.
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration
//! - [`envelope`] - The uniform response envelope
//! - [`error`] - Error-to-envelope conversion
//! - [`auth`] - JWT middleware and the admin gate
//! - [`state`] - Application state (store, index, synchronizer, config)
//! - [`handlers`] - HTTP request handlers, one module per entity
//! - [`routes`] - Route configuration under `/api/v1`

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod video_url;

// Re-export commonly used types
pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use scifun_persistence::index::SearchIndex;
use scifun_persistence::store::DocumentStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// Convenience wrapper over [`create_app_with_config`]; mostly useful in
/// tests, since a default configuration carries no JWT secret.
pub fn create_app<S, I>(store: Arc<S>, index: Arc<I>) -> Router
where
    S: DocumentStore + 'static,
    I: SearchIndex + 'static,
{
    create_app_with_config(store, index, ServerConfig::for_testing())
}

/// Creates the Axum application with custom configuration.
pub fn create_app_with_config<S, I>(
    store: Arc<S>,
    index: Arc<I>,
    config: ServerConfig,
) -> Router
where
    S: DocumentStore + 'static,
    I: SearchIndex + 'static,
{
    info!(
        "Creating REST API server with store: {}, index: {}",
        store.backend_name(),
        index.backend_name()
    );

    let request_timeout = config.request_timeout;
    let enable_cors = config.enable_cors;
    let cors = build_cors_layer(&config);

    let state = AppState::new(store, index, config);
    let router = routes::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(request_timeout),
        ));

    let router = if enable_cors {
        router.layer(cors)
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scifun_rest={},tower_http=debug", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
