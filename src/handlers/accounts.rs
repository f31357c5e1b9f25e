use axum::{body::Bytes, extract::State, http::StatusCode};
use chrono::Duration;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    AppState,
    auth::AuthUser,
    csrf,
    error::ApiError,
    handlers::parse_body,
    models::Credentials,
    password,
    repository::RepositoryError,
    session::{self, SESSION_COOKIE, Session},
};

/// signup
///
/// [Public Route] Creates an account. The password is hashed before it reaches the store.
#[utoipa::path(
    post,
    path = "/signup/",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing field, unparseable body or username taken"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn signup(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let credentials: Credentials = parse_body(&body)?;

    let hash = password::hash_password(&credentials.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    match state.repo.create_user(&credentials.username, &hash).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "user signed up");
            Ok(StatusCode::CREATED)
        }
        Err(RepositoryError::Duplicate(_)) => Err(ApiError::BadRequest(format!(
            "username {:?} is taken",
            credentials.username
        ))),
        Err(e) => Err(e.into()),
    }
}

/// issue_csrf_token
///
/// [Public Route] Sets the anti-forgery cookie if the client does not hold one yet.
#[utoipa::path(
    get,
    path = "/token/",
    responses(
        (status = 204, description = "csrftoken cookie set"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn issue_csrf_token(cookies: Cookies) -> StatusCode {
    if cookies.get(csrf::CSRF_COOKIE).is_none() {
        cookies.add(csrf::token_cookie(csrf::new_token()));
    }
    StatusCode::NO_CONTENT
}

/// signin
///
/// [Public Route] Verifies credentials, records a session and hands the client a signed
/// session cookie. A session the browser already holds is revoked.
#[utoipa::path(
    post,
    path = "/signin/",
    request_body = Credentials,
    responses(
        (status = 204, description = "Signed in; session cookie set"),
        (status = 400, description = "Unparseable body"),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    cookies: Cookies,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let credentials: Credentials = parse_body(&body)?;

    let verified = match state
        .repo
        .find_user_by_username(&credentials.username)
        .await?
    {
        Some(user) => password::verify_password(&user.password_hash, &credentials.password)
            .then_some(user),
        None => {
            password::verify_unknown_user(&credentials.password);
            None
        }
    };

    let Some(user) = verified else {
        tracing::info!(username = %credentials.username, "signin failed");
        return Err(ApiError::Unauthenticated);
    };

    // Signing in again from the same browser replaces its previous session.
    if let Some(previous) = cookies.get(SESSION_COOKIE) {
        if let Ok(claims) = session::decode_token(previous.value(), &state.config.session_secret) {
            state.sessions.revoke(claims.sid).await?;
            tracing::debug!(session_id = %claims.sid, "previous session replaced");
        }
    }

    let session = Session::new(user.id, Duration::hours(state.config.session_ttl_hours));
    state.sessions.insert(&session).await?;
    let token = session.issue_token(&state.config.session_secret)?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookies.add(cookie);

    tracing::info!(user_id = user.id, session_id = %session.id, "user signed in");
    Ok(StatusCode::NO_CONTENT)
}

/// signout
///
/// [Authenticated Route] Revokes the caller's session and clears the cookie.
#[utoipa::path(
    get,
    path = "/signout/",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "No valid session"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn signout(
    caller: AuthUser,
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<StatusCode, ApiError> {
    state.sessions.revoke(caller.session_id).await?;

    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);

    tracing::info!(user_id = caller.id, session_id = %caller.session_id, "user signed out");
    Ok(StatusCode::NO_CONTENT)
}
