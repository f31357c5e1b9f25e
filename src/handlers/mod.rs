//! Request handlers.
//!
//! Every handler follows the same precedence: authentication (the `AuthUser` argument),
//! then method applicability (the route's fallback), then existence, then ownership,
//! and only then the body. Bodies arrive as raw bytes and go through [`parse_body`]
//! explicitly, so a malformed body can never mask a 404 or 403.

pub mod accounts;
pub mod articles;
pub mod comments;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::{auth::AuthUser, error::ApiError, models::RequestBody};

/// parse_body
///
/// Decodes a JSON body into its schema and applies the schema's field checks.
/// The `Content-Type` header is not consulted.
pub fn parse_body<T: RequestBody>(body: &[u8]) -> Result<T, ApiError> {
    let parsed: T =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    parsed.validate().map_err(ApiError::BadRequest)?;
    Ok(parsed)
}

/// ResourceId
///
/// The numeric `{id}` path segment. A segment that is not an integer cannot name a stored
/// resource, so it is rejected as `NotFound` rather than as a malformed request.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "unparseable resource id");
                ApiError::NotFound
            })?;
        Ok(ResourceId(id))
    }
}

/// Method fallback for public routes.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Method fallback for authenticated routes: an anonymous caller gets 401 before 405.
pub async fn authenticated_method_not_allowed(_caller: AuthUser) -> ApiError {
    ApiError::MethodNotAllowed
}
