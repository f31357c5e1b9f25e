use crate::{
    AppState,
    handlers::{accounts, method_not_allowed},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call. Each path lists its one supported method and answers
/// everything else with 405. `get` would also serve HEAD, so HEAD is routed to the
/// fallback explicitly.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /signup/
        // Creates an account from {username, password}.
        .route(
            "/signup/",
            post(accounts::signup).fallback(method_not_allowed),
        )
        // GET /token/
        // Primes the csrftoken cookie that state-changing requests must echo back.
        .route(
            "/token/",
            get(accounts::issue_csrf_token)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        // POST /signin/
        // Verifies credentials and sets the session cookie.
        .route(
            "/signin/",
            post(accounts::signin).fallback(method_not_allowed),
        )
}
