use axum::{Json, body::Bytes, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{ResourceId, parse_body},
    models::{Article, ArticleCreated, ArticleDetail, ArticlePayload, ArticleSummary, ArticleUpdated},
};

async fn load_article(state: &AppState, id: i64) -> Result<Article, ApiError> {
    state.repo.get_article(id).await?.ok_or(ApiError::NotFound)
}

/// list_articles
///
/// [Authenticated Route] Every article, regardless of who wrote it.
#[utoipa::path(
    get,
    path = "/article/",
    responses(
        (status = 200, description = "All articles", body = [ArticleSummary]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_articles(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let articles = state.repo.list_articles().await?;
    Ok(Json(articles.into_iter().map(ArticleSummary::from).collect()))
}

/// create_article
///
/// [Authenticated Route] Publishes an article owned by the caller.
#[utoipa::path(
    post,
    path = "/article/",
    request_body = ArticlePayload,
    responses(
        (status = 201, description = "Created", body = ArticleCreated),
        (status = 400, description = "Missing title/content or unparseable body"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn create_article(
    caller: AuthUser,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ArticleCreated>), ApiError> {
    let payload: ArticlePayload = parse_body(&body)?;
    let article = state
        .repo
        .create_article(caller.id, &payload.title, &payload.content)
        .await?;

    tracing::debug!(article_id = article.id, user_id = caller.id, "article created");
    Ok((
        StatusCode::CREATED,
        Json(ArticleCreated {
            id: article.id,
            title: article.title,
            content: article.content,
        }),
    ))
}

/// get_article
///
/// [Authenticated Route] A single article with its author resolved to a username.
#[utoipa::path(
    get,
    path = "/article/{id}/",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ArticleDetail),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(
    _caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ArticleDetail>, ApiError> {
    let article = load_article(&state, id).await?;
    let author = state
        .repo
        .find_user(article.author_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("article {id} has no author row")))?;

    Ok(Json(ArticleDetail {
        title: article.title,
        content: article.content,
        author: author.username,
    }))
}

/// update_article
///
/// [Authenticated Route] Replaces title and content. Author only.
#[utoipa::path(
    put,
    path = "/article/{id}/",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = ArticlePayload,
    responses(
        (status = 200, description = "Updated", body = ArticleUpdated),
        (status = 400, description = "Missing title/content or unparseable body"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_article(
    caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    body: Bytes,
) -> Result<Json<ArticleUpdated>, ApiError> {
    let article = load_article(&state, id).await?;
    caller.authorize_modification(&article)?;
    let payload: ArticlePayload = parse_body(&body)?;

    // A concurrent delete between the check and the write surfaces as 404.
    let article = state
        .repo
        .update_article(id, &payload.title, &payload.content)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ArticleUpdated {
        id: article.id,
        title: article.title,
        content: article.content,
        author: caller.username,
    }))
}

/// delete_article
///
/// [Authenticated Route] Removes the article and, with it, all of its comments. Author only.
#[utoipa::path(
    delete,
    path = "/article/{id}/",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_article(
    caller: AuthUser,
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, ApiError> {
    let article = load_article(&state, id).await?;
    caller.authorize_modification(&article)?;

    if !state.repo.delete_article(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(article_id = id, user_id = caller.id, "article deleted");
    Ok(StatusCode::OK)
}
