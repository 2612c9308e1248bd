/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use menuly_api::{app::AppState, config::Config};
/// use menuly_shared::baas::{ClientContext, SupabaseClient};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let baas = SupabaseClient::for_context(&config.baas, ClientContext::Server)?;
/// let state = AppState::new(Arc::new(baas), config);
/// let app = menuly_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    middleware::{admin_key::admin_key_layer, security::SecurityHeadersLayer},
};
use axum::{
    http::{header, HeaderMap, HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use menuly_shared::{
    auth::session::{Session, SessionResolver},
    baas::Baas,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside
/// is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server-context backend handle
    pub baas: Arc<dyn Baas>,

    /// Resolves request credentials against `baas`
    pub sessions: SessionResolver,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(baas: Arc<dyn Baas>, config: Config) -> Self {
        Self {
            sessions: SessionResolver::new(Arc::clone(&baas)),
            baas,
            config: Arc::new(config),
        }
    }

    /// Resolves the caller's session or fails with 401
    pub async fn require_session(&self, headers: &HeaderMap) -> ApiResult<Session> {
        self.sessions
            .resolve_headers(headers)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Not signed in".to_string()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                       # Backend reachability (public)
/// └── /api/
///     ├── GET    /session               # Current session
///     ├── GET    /staff                 # Caller's staff
///     ├── POST   /staff                 # Create staff account
///     ├── DELETE /staff/:id             # Delete staff row
///     ├── GET    /qr-codes              # Caller's QR codes
///     └── /admin/                       # ?key=<ADMIN_API_KEY>
///         ├── GET  /users
///         └── POST /users
/// ```
///
/// Session routes resolve the caller inside the handler, so payload
/// validation can reject a request before the backend is contacted.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Admin key (admin routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let session_routes = Router::new()
        .route("/session", get(routes::session::current_session))
        .route(
            "/staff",
            get(routes::staff::list_staff).post(routes::staff::create_staff),
        )
        .route("/staff/:id", delete(routes::staff::delete_staff))
        .route("/qr-codes", get(routes::qr_codes::list_qr_codes));

    let admin_routes = Router::new()
        .route(
            "/users",
            get(routes::admin::list_users).post(routes::admin::create_user),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_key_layer,
        ));

    let api_routes = session_routes.nest("/admin", admin_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
