//! # Remote Fill Service
//!
//! An HTTP service that fills a PDF template for one submission (returning
//! the PDF) or many (returning a ZIP), using the same engine as every other
//! formfill entry point.
//!
//! ## Usage
//!
//! ```bash
//! formfill serve --listen 0.0.0.0:8787
//! ```
//!
//! ```bash
//! curl -X POST http://localhost:8787/ \
//!   -H 'content-type: application/json' \
//!   -d '{"mode":"single","submissions":[{"full_name":"Jane Doe"}],
//!        "mapping":{"fields":[{"name":"full_name","x":50,"y":100}]},
//!        "templateUrl":"https://cdn.example.com/code-of-conduct.pdf"}' \
//!   -o Jane_Doe.pdf
//! ```

mod config;
mod error;
mod handlers;
mod state;

pub use config::{ServerConfig, DEFAULT_BODY_LIMIT};
pub use error::{ApiError, ServerError};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the service routes
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit;

    Router::new()
        .route("/", post(handlers::fill))
        .route("/pdf-export", post(handlers::fill))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors())
        .with_state(state)
}

/// Any origin may call the service
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
        .expose_headers([CONTENT_DISPOSITION])
}

/// Start the fill service.
///
/// ## Example
///
/// ```no_run
/// use fill_server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), fill_server::ServerError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8787".to_string(),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;

    log::info!("fill service listening on {}", config.listen_addr);
    if config.allow_loopback_templates {
        log::warn!("loopback template URLs are accepted");
    }

    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
