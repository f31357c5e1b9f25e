use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// Longest title the `articles.title` column accepts.
pub const MAX_TITLE_CHARS: usize = 64;

// --- Stored Entities ---

/// User
///
/// An account in the credential store. The hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Article
///
/// A row of the `articles` table. `author_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

/// Comment
///
/// A row of the `comments` table. Both `article_id` and `author_id` are fixed at creation.
#[derive(Debug, Clone, PartialEq, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub author_id: i64,
    pub content: String,
}

/// Owned
///
/// Anything with an author. The only permission in the system is "the author may modify it".
pub trait Owned {
    fn author_id(&self) -> i64;
}

impl Owned for Article {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

// --- Request Payloads (Input Schemas) ---

/// RequestBody
///
/// A JSON request schema plus the field-level checks serde cannot express.
pub trait RequestBody: DeserializeOwned {
    fn validate(&self) -> Result<(), String>;
}

/// Credentials
///
/// Body of POST /signup/ and POST /signin/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    #[schema(example = "swpp")]
    pub username: String,
    #[schema(example = "iluvswpp")]
    pub password: String,
}

impl RequestBody for Credentials {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

/// ArticlePayload
///
/// Body of POST /article/ and PUT /article/{id}/. Both fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticlePayload {
    #[schema(example = "I Love SWPP!")]
    pub title: String,
    #[schema(example = "Believe it or not")]
    pub content: String,
}

impl RequestBody for ArticlePayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)?;
        require_non_empty("content", &self.content)?;
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(format!("title exceeds {MAX_TITLE_CHARS} characters"));
        }
        Ok(())
    }
}

/// CommentPayload
///
/// Body of POST /article/{id}/comment/ and PUT /comment/{id}/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentPayload {
    #[schema(example = "Comment!")]
    pub content: String,
}

impl RequestBody for CommentPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("content", &self.content)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

// --- Response Schemas (Output) ---

/// ArticleSummary
///
/// One entry of GET /article/. `author` is the author's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleSummary {
    pub title: String,
    pub content: String,
    #[ts(type = "number")]
    pub author: i64,
}

impl From<Article> for ArticleSummary {
    fn from(article: Article) -> Self {
        Self {
            title: article.title,
            content: article.content,
            author: article.author_id,
        }
    }
}

/// ArticleCreated
///
/// Response of POST /article/.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleCreated {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// ArticleDetail
///
/// Response of GET /article/{id}/. `author` is resolved to the username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleDetail {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// ArticleUpdated
///
/// Response of PUT /article/{id}/.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleUpdated {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
}

/// CommentView
///
/// A comment as read back: owning article id, author user id, text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentView {
    #[ts(type = "number")]
    pub article: i64,
    #[ts(type = "number")]
    pub author: i64,
    pub content: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            article: comment.article_id,
            author: comment.author_id,
            content: comment.content,
        }
    }
}

/// CommentSaved
///
/// Response of comment creation and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentSaved {
    #[ts(type = "number")]
    pub id: i64,
    pub content: String,
}

impl From<Comment> for CommentSaved {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
        }
    }
}
