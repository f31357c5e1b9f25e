use axum::{Json, body::Bytes, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{ResourceId, parse_body},
    models::{Comment, CommentPayload, CommentSaved, CommentView},
};

async fn ensure_article_exists(state: &AppState, article_id: i64) -> Result<(), ApiError> {
    match state.repo.get_article(article_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound),
    }
}

async fn load_comment(state: &AppState, id: i64) -> Result<Comment, ApiError> {
    state.repo.get_comment(id).await?.ok_or(ApiError::NotFound)
}

/// list_article_comments
///
/// [Authenticated Route] All comments on an article, oldest first.
#[utoipa::path(
    get,
    path = "/article/{id}/comment/",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Comments on the article", body = [CommentView]),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Article Not Found")
    )
)]
pub async fn list_article_comments(
    _caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(article_id): ResourceId,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    ensure_article_exists(&state, article_id).await?;
    let comments = state.repo.list_comments(article_id).await?;
    Ok(Json(comments.into_iter().map(CommentView::from).collect()))
}

/// create_comment
///
/// [Authenticated Route] Comments on an existing article as the caller.
#[utoipa::path(
    post,
    path = "/article/{id}/comment/",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = CommentPayload,
    responses(
        (status = 201, description = "Comment Added", body = CommentSaved),
        (status = 400, description = "Missing content or unparseable body"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Article Not Found")
    )
)]
pub async fn create_comment(
    caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(article_id): ResourceId,
    body: Bytes,
) -> Result<(StatusCode, Json<CommentSaved>), ApiError> {
    ensure_article_exists(&state, article_id).await?;
    let payload: CommentPayload = parse_body(&body)?;

    let comment = state
        .repo
        .create_comment(article_id, caller.id, &payload.content)
        .await?;

    tracing::debug!(comment_id = comment.id, article_id, user_id = caller.id, "comment created");
    Ok((StatusCode::CREATED, Json(CommentSaved::from(comment))))
}

/// get_comment
///
/// [Authenticated Route] A single comment.
#[utoipa::path(
    get,
    path = "/comment/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Found", body = CommentView),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    _caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<CommentView>, ApiError> {
    let comment = load_comment(&state, id).await?;
    Ok(Json(CommentView::from(comment)))
}

/// update_comment
///
/// [Authenticated Route] Replaces the comment text. Author only.
#[utoipa::path(
    put,
    path = "/comment/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Updated", body = CommentSaved),
        (status = 400, description = "Missing content or unparseable body"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> Result<Json<CommentSaved>, ApiError> {
    let comment = load_comment(&state, id).await?;
    caller.authorize_modification(&comment)?;
    let payload: CommentPayload = parse_body(&body)?;

    let comment = state
        .repo
        .update_comment(id, &payload.content)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(CommentSaved::from(comment)))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment. Author only.
#[utoipa::path(
    delete,
    path = "/comment/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, ApiError> {
    let comment = load_comment(&state, id).await?;
    caller.authorize_modification(&comment)?;

    if !state.repo.delete_comment(id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::OK)
}
