use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{repository::RepositoryError, session::SessionError};

/// ApiError
///
/// Every way a request can fail. Each variant maps to exactly one status code and is
/// returned with an empty body; the message only ever reaches the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session accompanies the request.
    #[error("authentication required")]
    Unauthenticated,
    /// Authenticated, but the caller does not own the resource.
    #[error("caller is not the author of this resource")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    /// The body is missing a required field or is not parseable as the expected schema.
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    /// The anti-forgery header is missing or does not match the issued cookie.
    #[error("anti-forgery token missing or mismatched")]
    CsrfRejected,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::CsrfRejected => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(detail) => tracing::error!(%detail, "request failed"),
            other => tracing::debug!(error = %other, "request rejected"),
        }
        self.status().into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(what) => ApiError::BadRequest(format!("{what} already exists")),
            // The parent row vanished between the existence check and the insert.
            RepositoryError::MissingParent => ApiError::NotFound,
            RepositoryError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
