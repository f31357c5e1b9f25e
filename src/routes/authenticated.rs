use crate::{
    AppState,
    handlers::{accounts, articles, authenticated_method_not_allowed, comments},
};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every handler here, and every method fallback, takes an `AuthUser`, so the session is
/// checked before anything else about the request. Ownership checks for mutations happen
/// inside the handlers once the resource has been loaded.
///
/// HEAD is routed to the fallback explicitly: `get` would otherwise serve it, and a HEAD
/// to /signout/ would revoke the session without passing the anti-forgery guard.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /signout/
        // Revokes the current session.
        .route(
            "/signout/",
            get(accounts::signout)
                .head(authenticated_method_not_allowed)
                .fallback(authenticated_method_not_allowed),
        )
        // --- Articles ---
        // GET/POST /article/
        // Lists every article, or publishes a new one owned by the caller.
        .route(
            "/article/",
            get(articles::list_articles)
                .head(authenticated_method_not_allowed)
                .post(articles::create_article)
                .fallback(authenticated_method_not_allowed),
        )
        // GET/PUT/DELETE /article/{id}/
        // Reads one article; updates and deletes are author-only.
        .route(
            "/article/{id}/",
            get(articles::get_article)
                .head(authenticated_method_not_allowed)
                .put(articles::update_article)
                .delete(articles::delete_article)
                .fallback(authenticated_method_not_allowed),
        )
        // --- Comments ---
        // GET/POST /article/{id}/comment/
        // Lists an article's comments, or adds one.
        .route(
            "/article/{id}/comment/",
            get(comments::list_article_comments)
                .head(authenticated_method_not_allowed)
                .post(comments::create_comment)
                .fallback(authenticated_method_not_allowed),
        )
        // GET/PUT/DELETE /comment/{id}/
        // Reads one comment; updates and deletes are author-only.
        .route(
            "/comment/{id}/",
            get(comments::get_comment)
                .head(authenticated_method_not_allowed)
                .put(comments::update_comment)
                .delete(comments::delete_comment)
                .fallback(authenticated_method_not_allowed),
        )
}
