use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    models::{Article, Comment, User},
    repository::{Repository, RepositoryError},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    articles: BTreeMap<i64, Article>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_article_id: i64,
    last_comment_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. Used when no `DATABASE_URL` is
/// configured and throughout the test suite. Ids start at 1 and are never reused,
/// matching a Postgres `BIGSERIAL`.
///
/// One lock guards all tables so a cascade delete is atomic with respect to readers.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.username == username) {
            return Err(RepositoryError::Duplicate("username"));
        }
        let user = User {
            id: next_id(&mut tables.last_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.username == username).cloned())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        Ok(self.tables.read().await.articles.values().cloned().collect())
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError> {
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn create_article(&self, author_id: i64, title: &str, content: &str) -> Result<Article, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&author_id) {
            return Err(RepositoryError::MissingParent);
        }
        let article = Article {
            id: next_id(&mut tables.last_article_id),
            title: title.to_string(),
            content: content.to_string(),
            author_id,
        };
        tables.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: i64, title: &str, content: &str) -> Result<Option<Article>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.articles.get_mut(&id).map(|article| {
            article.title = title.to_string();
            article.content = content.to_string();
            article.clone()
        }))
    }

    async fn delete_article(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.articles.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, comment| comment.article_id != id);
        Ok(true)
    }

    async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create_comment(&self, article_id: i64, author_id: i64, content: &str) -> Result<Comment, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.articles.contains_key(&article_id) || !tables.users.contains_key(&author_id) {
            return Err(RepositoryError::MissingParent);
        }
        let comment = Comment {
            id: next_id(&mut tables.last_comment_id),
            article_id,
            author_id,
            content: content.to_string(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}
