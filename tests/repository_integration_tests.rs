use blog_api::{
    InMemoryRepository, PostgresRepository, PostgresSessionStore,
    repository::{Repository, RepositoryError},
    session::{Session, SessionStore},
};
use chrono::Duration;
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Holds the database pool for the Postgres-backed tests.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

/// A username no earlier run against the same database has taken.
fn unique_username(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

// --- Shared Behaviour ---

// Both stores must agree on everything the handlers rely on.

async fn check_user_rules(repo: &dyn Repository) {
    let username = unique_username("swpp");
    let user = repo.create_user(&username, "hash").await.unwrap();
    assert_eq!(user.username, username);

    let duplicate = repo.create_user(&username, "other-hash").await;
    assert!(matches!(duplicate, Err(RepositoryError::Duplicate(_))));

    let found = repo.find_user_by_username(&username).await.unwrap();
    assert_eq!(found.as_ref().map(|u| u.id), Some(user.id));
    assert_eq!(repo.find_user(user.id).await.unwrap(), Some(user));
    assert!(repo.find_user_by_username("nobody-by-that-name").await.unwrap().is_none());
}

async fn check_article_rules(repo: &dyn Repository) {
    let author = repo.create_user(&unique_username("author"), "hash").await.unwrap();

    let article = repo
        .create_article(author.id, "I Love SWPP!", "Believe it or not")
        .await
        .unwrap();
    assert_eq!(article.author_id, author.id);
    assert_eq!(repo.get_article(article.id).await.unwrap(), Some(article.clone()));
    assert!(repo.list_articles().await.unwrap().contains(&article));

    let updated = repo
        .update_article(article.id, "Edited", "Still believe it")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, article.id);
    assert_eq!(updated.title, "Edited");
    assert_eq!(updated.author_id, author.id);

    assert!(repo.update_article(i64::MAX, "t", "c").await.unwrap().is_none());

    assert!(repo.delete_article(article.id).await.unwrap());
    assert!(!repo.delete_article(article.id).await.unwrap());
    assert!(repo.get_article(article.id).await.unwrap().is_none());
}

async fn check_comment_rules(repo: &dyn Repository) {
    let author = repo.create_user(&unique_username("author"), "hash").await.unwrap();
    let reader = repo.create_user(&unique_username("reader"), "hash").await.unwrap();
    let article = repo.create_article(author.id, "Title", "Body").await.unwrap();

    let first = repo.create_comment(article.id, reader.id, "First!").await.unwrap();
    let second = repo.create_comment(article.id, author.id, "Thanks").await.unwrap();
    assert!(second.id > first.id);

    let listed = repo.list_comments(article.id).await.unwrap();
    assert_eq!(listed, vec![first.clone(), second.clone()]);

    let edited = repo.update_comment(first.id, "Edited").await.unwrap().unwrap();
    assert_eq!(edited.content, "Edited");
    assert_eq!(edited.article_id, article.id);
    assert_eq!(edited.author_id, reader.id);

    let orphan = repo.create_comment(i64::MAX, reader.id, "Nowhere").await;
    assert!(matches!(orphan, Err(RepositoryError::MissingParent)));

    assert!(repo.delete_comment(second.id).await.unwrap());
    assert!(!repo.delete_comment(second.id).await.unwrap());

    // Deleting the article takes the remaining comment with it.
    assert!(repo.delete_article(article.id).await.unwrap());
    assert!(repo.get_comment(first.id).await.unwrap().is_none());
    assert!(repo.list_comments(article.id).await.unwrap().is_empty());
}

async fn check_session_rules(store: &dyn SessionStore, user_id: i64) {
    let session = Session::new(user_id, Duration::hours(1));
    store.insert(&session).await.unwrap();

    assert!(store.is_active(session.id, user_id).await.unwrap());
    assert!(!store.is_active(session.id, user_id + 1).await.unwrap());
    assert!(!store.is_active(Uuid::new_v4(), user_id).await.unwrap());

    store.revoke(session.id).await.unwrap();
    assert!(!store.is_active(session.id, user_id).await.unwrap());
    // Revoking twice is harmless.
    store.revoke(session.id).await.unwrap();

    let expired = Session::new(user_id, Duration::seconds(-1));
    store.insert(&expired).await.unwrap();
    assert!(!store.is_active(expired.id, user_id).await.unwrap());

    // The next signin sweeps the expired record away.
    let later = Session::new(user_id, Duration::hours(1));
    store.insert(&later).await.unwrap();
    assert_eq!(store.purge_expired().await.unwrap(), 0);
    assert!(store.is_active(later.id, user_id).await.unwrap());
}

// --- In-Memory Store Tests ---

#[test]
async fn test_memory_user_rules() {
    check_user_rules(&InMemoryRepository::new()).await;
}

#[test]
async fn test_memory_article_rules() {
    check_article_rules(&InMemoryRepository::new()).await;
}

#[test]
async fn test_memory_comment_rules() {
    check_comment_rules(&InMemoryRepository::new()).await;
}

#[test]
async fn test_memory_ids_start_at_one_and_are_not_reused() {
    let repo = InMemoryRepository::new();
    let author = repo.create_user("swpp", "hash").await.unwrap();
    assert_eq!(author.id, 1);

    let first = repo.create_article(author.id, "a", "b").await.unwrap();
    assert_eq!(first.id, 1);
    repo.delete_article(first.id).await.unwrap();

    let second = repo.create_article(author.id, "a", "b").await.unwrap();
    assert_eq!(second.id, 2);
}

#[test]
async fn test_memory_article_requires_existing_author() {
    let repo = InMemoryRepository::new();

    let result = repo.create_article(99, "Title", "Body").await;

    assert!(matches!(result, Err(RepositoryError::MissingParent)));
}

#[test]
async fn test_memory_session_rules() {
    check_session_rules(&blog_api::MemorySessionStore::new(), 1).await;
}

#[test]
async fn test_memory_purge_counts_expired_sessions() {
    let store = blog_api::MemorySessionStore::new();
    let live = Session::new(1, Duration::hours(1));
    store.insert(&live).await.unwrap();
    store.insert(&Session::new(1, Duration::seconds(-1))).await.unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
    assert!(store.is_active(live.id, 1).await.unwrap());
}

// --- Postgres Tests ---

// Run with a live database: DATABASE_URL=... cargo test -- --ignored

#[test]
#[ignore]
async fn test_postgres_user_rules() {
    let ctx = DbTestContext::setup().await;
    check_user_rules(&ctx.repository()).await;
}

#[test]
#[ignore]
async fn test_postgres_article_rules() {
    let ctx = DbTestContext::setup().await;
    check_article_rules(&ctx.repository()).await;
}

#[test]
#[ignore]
async fn test_postgres_comment_rules() {
    let ctx = DbTestContext::setup().await;
    check_comment_rules(&ctx.repository()).await;
}

#[test]
#[ignore]
async fn test_postgres_session_rules() {
    let ctx = DbTestContext::setup().await;
    let user = ctx
        .repository()
        .create_user(&unique_username("session"), "hash")
        .await
        .unwrap();

    check_session_rules(&PostgresSessionStore::new(ctx.pool.clone()), user.id).await;
}
