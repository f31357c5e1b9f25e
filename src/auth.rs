use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ApiError,
    models::Owned,
    repository::RepositoryState,
    session::{self, SESSION_COOKIE, SessionState},
};

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers receive it as an
/// argument; there is no ambient "current user".
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the user.
    pub id: i64,
    /// Display name, echoed back in article responses.
    pub username: String,
    /// The session this request rides on; signout revokes it.
    pub session_id: Uuid,
}

impl AuthUser {
    /// can_modify
    ///
    /// The ownership capability: only the author may update or delete a resource.
    pub fn can_modify<R: Owned>(&self, resource: &R) -> bool {
        resource.author_id() == self.id
    }

    /// Applies [`AuthUser::can_modify`], turning a refusal into `Forbidden`.
    pub fn authorize_modification<R: Owned>(&self, resource: &R) -> Result<(), ApiError> {
        if self.can_modify(resource) {
            Ok(())
        } else {
            tracing::info!(
                user_id = self.id,
                author_id = resource.author_id(),
                "modification denied: caller is not the author"
            );
            Err(ApiError::Forbidden)
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, so every authenticated handler simply takes
/// an `AuthUser` argument and authentication stays out of the business logic.
///
/// The entire process involves:
/// 1. Dependency Resolution: Repository, SessionStore and AppConfig from the application state.
/// 2. Cookie Extraction: the signed token in the `sessionid` cookie.
/// 3. Token Validation: signature and expiry.
/// 4. Session Lookup: the session must still be live (not signed out).
/// 5. User Lookup: the account must still exist.
///
/// Rejection: `ApiError::Unauthenticated` (401) on any failure; store errors surface as 500.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Cookie Extraction
        let token = session::cookie_value(&parts.headers, SESSION_COOKIE)
            .ok_or(ApiError::Unauthenticated)?;

        // 3. Decode and Validate the Token
        let claims = match session::decode_token(&token, &config.session_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("rejecting session cookie: {e}");
                return Err(ApiError::Unauthenticated);
            }
        };

        // 4. Session Lookup: a signed-out session stays dead even if the token has not expired.
        if !sessions.is_active(claims.sid, claims.sub).await? {
            return Err(ApiError::Unauthenticated);
        }

        // 5. User Lookup
        let user = repo
            .find_user(claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            session_id: claims.sid,
        })
    }
}
