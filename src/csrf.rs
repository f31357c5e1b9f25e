//! Double-submit anti-forgery protection.
//!
//! `GET /token/` drops a random token into the `csrftoken` cookie. Every state-changing
//! request must echo that value in the `X-CSRFToken` header; a page on another origin
//! can make the browser send the cookie but cannot read it to forge the header.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::{Cookie, cookie::SameSite};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, session::cookie_value};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// A fresh, unguessable token value.
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The cookie `GET /token/` sets. Readable by scripts on purpose: the client copies it
/// into the request header.
pub fn token_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(CSRF_COOKIE, value);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// csrf_guard
///
/// Middleware rejecting state-changing requests without a matching token with 403.
/// Runs before routing decisions, so even a POST to a GET-only path needs the token.
pub async fn csrf_guard(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    if !config.csrf_enforce || !is_state_changing(request.method()) {
        return next.run(request).await;
    }

    let token_matches = {
        let headers = request.headers();
        let expected = cookie_value(headers, CSRF_COOKIE);
        let provided = headers
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok());
        matches!(
            (expected.as_deref(), provided),
            (Some(expected), Some(provided)) if !expected.is_empty() && expected == provided
        )
    };

    if token_matches {
        next.run(request).await
    } else {
        tracing::info!(method = %request.method(), uri = %request.uri(), "csrf check failed");
        ApiError::CsrfRejected.into_response()
    }
}
