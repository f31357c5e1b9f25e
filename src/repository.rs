use crate::models::{Article, Comment, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

/// RepositoryError
///
/// Store failures. Constraint violations are classified so handlers can answer with a
/// client error instead of a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write (e.g. a taken username).
    #[error("{0} already exists")]
    Duplicate(&'static str),
    /// The referenced parent row does not exist.
    #[error("referenced parent row does not exist")]
    MissingParent,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return RepositoryError::Duplicate("record");
            }
            if db.is_foreign_key_violation() {
                return RepositoryError::MissingParent;
            }
        }
        RepositoryError::Database(err)
    }
}

/// Repository Trait
///
/// The abstract contract for every persistence operation, so handlers never know
/// whether they talk to Postgres or the in-memory store.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Fails with `Duplicate` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    // --- Articles ---
    // Every article, ordered by id.
    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError>;
    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError>;
    async fn create_article(&self, author_id: i64, title: &str, content: &str) -> Result<Article, RepositoryError>;
    // Returns `None` if the article does not exist.
    async fn update_article(&self, id: i64, title: &str, content: &str) -> Result<Option<Article>, RepositoryError>;
    // Deletes the article together with its comments. Returns false if nothing was deleted.
    async fn delete_article(&self, id: i64) -> Result<bool, RepositoryError>;

    // --- Comments ---
    // Comments on one article, ordered by id.
    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>, RepositoryError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError>;
    // Fails with `MissingParent` when the article does not exist.
    async fn create_comment(&self, article_id: i64, author_id: i64, content: &str) -> Result<Comment, RepositoryError>;
    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>, RepositoryError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL. Schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Duplicate(_) => RepositoryError::Duplicate("username"),
            other => other,
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        let articles = sqlx::query_as::<_, Article>("SELECT id, title, content, author_id FROM articles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError> {
        let article = sqlx::query_as::<_, Article>("SELECT id, title, content, author_id FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn create_article(&self, author_id: i64, title: &str, content: &str) -> Result<Article, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(
            "INSERT INTO articles (title, content, author_id) VALUES ($1, $2, $3) RETURNING id, title, content, author_id",
        )
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    async fn update_article(&self, id: i64, title: &str, content: &str) -> Result<Option<Article>, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $2, content = $3
            WHERE id = $1
            RETURNING id, title, content, author_id
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    /// delete_article
    ///
    /// A single statement; `ON DELETE CASCADE` on `comments.article_id` removes the
    /// article's comments in the same transaction.
    async fn delete_article(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>, RepositoryError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, article_id, author_id, content FROM comments WHERE article_id = $1 ORDER BY id",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT id, article_id, author_id, content FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn create_comment(&self, article_id: i64, author_id: i64, content: &str) -> Result<Comment, RepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (article_id, author_id, content) VALUES ($1, $2, $3) RETURNING id, article_id, author_id, content",
        )
        .bind(article_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2 WHERE id = $1 RETURNING id, article_id, author_id, content",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
