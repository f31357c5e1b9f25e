use axum::{
    Json, Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::OpenApi;

// --- Modules ---

// Domain, persistence and request plumbing.
pub mod auth;
pub mod config;
pub mod csrf;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod password;
pub mod repository;
pub mod session;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use memory::InMemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};
pub use session::{MemorySessionStore, PostgresSessionStore, SessionState};

/// ApiDoc
///
/// The OpenAPI document for every route, assembled from the `#[utoipa::path]` and
/// `#[derive(utoipa::ToSchema)]` annotations. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::accounts::signup, handlers::accounts::issue_csrf_token,
        handlers::accounts::signin, handlers::accounts::signout,
        handlers::articles::list_articles, handlers::articles::create_article,
        handlers::articles::get_article, handlers::articles::update_article,
        handlers::articles::delete_article,
        handlers::comments::list_article_comments, handlers::comments::create_comment,
        handlers::comments::get_comment, handlers::comments::update_comment,
        handlers::comments::delete_comment
    ),
    components(
        schemas(
            models::Credentials, models::ArticlePayload, models::CommentPayload,
            models::ArticleSummary, models::ArticleCreated, models::ArticleDetail,
            models::ArticleUpdated, models::CommentView, models::CommentSaved,
        )
    ),
    tags(
        (name = "blog-api", description = "Session-authenticated blog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Articles, comments and user accounts.
    pub repo: RepositoryState,
    /// Live sessions, consulted on every authenticated request.
    pub sessions: SessionState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State backed entirely by process memory. Used without a database and in tests.
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            repo: Arc::new(InMemoryRepository::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors such as `AuthUser` pull only the component they need.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// create_router
///
/// Assembles the routing table, applies the anti-forgery guard and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. Cross-origin policy
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Correlation header shared by the request-id layers.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Routes and the anti-forgery guard
    let base_router = Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        // Anti-forgery check on every state-changing request, before any handler runs.
        .layer(middleware::from_fn_with_state(state.clone(), csrf::csrf_guard))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. Cookie jar for handlers that set or clear cookies.
        .layer(CookieManagerLayer::new())
        // 5. CORS Layer (outermost)
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span so every log line of a request carries its method, URI
/// and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
