use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tower_cookies::Cookie;
use uuid::Uuid;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "sessionid";

/// Claims
///
/// Payload of the signed session token stored in the session cookie.
/// The signature proves the server issued it; the `sid` lets signout revoke it early.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): id of the signed-in user.
    pub sub: i64,
    /// Session id (sid): key of the server-side session record.
    pub sid: Uuid,
    /// Issued At (iat).
    pub iat: usize,
    /// Expiration Time (exp). Matches the session record's expiry.
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("session store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Session
///
/// A server-side session record, established by signin and torn down by signout.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Signs the session into the token that travels in the session cookie.
    pub fn issue_token(&self, secret: &str) -> Result<String, SessionError> {
        let claims = Claims {
            sub: self.user_id,
            sid: self.id,
            iat: self.issued_at.timestamp().max(0) as usize,
            exp: self.expires_at.timestamp().max(0) as usize,
        };
        let key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }
}

/// Verifies signature and expiry of a session token and returns its claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    Ok(decode::<Claims>(token, &key, &validation)?.claims)
}

/// Finds a cookie by name in the raw `Cookie` request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

// 1. SessionStore Contract
/// SessionStore
///
/// Server-side record of live sessions. A token whose session is missing, expired or
/// owned by a different user is rejected even when its signature is valid.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Records a new session. Expired sessions are purged first, so the store stays
    /// bounded by the number of live sessions.
    async fn insert(&self, session: &Session) -> Result<(), SessionError>;

    /// True if `id` names an unexpired session belonging to `user_id`.
    async fn is_active(&self, id: Uuid, user_id: i64) -> Result<bool, SessionError>;

    /// Removes the session. Revoking an unknown id is not an error.
    async fn revoke(&self, id: Uuid) -> Result<(), SessionError>;

    /// Deletes every expired session and returns how many were removed.
    async fn purge_expired(&self) -> Result<u64, SessionError>;
}

// 2. The Real Implementation (Postgres)
/// PostgresSessionStore
///
/// Sessions in the `sessions` table; rows cascade away with their user.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        self.purge_expired().await?;
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_active(&self, id: Uuid, user_id: i64) -> Result<bool, SessionError> {
        let live: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1 AND user_id = $2 AND expires_at > NOW())",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(live)
    }

    async fn revoke(&self, id: Uuid) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(purged = result.rows_affected(), "expired sessions removed");
        }
        Ok(result.rows_affected())
    }
}

// 3. The In-Memory Implementation (local runs and tests)
/// MemorySessionStore
///
/// Sessions in a process-local map. Expired entries are dropped on lookup and swept on
/// every insert.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, live| live.expires_at > now);
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn is_active(&self, id: Uuid, user_id: i64) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(session) if session.expires_at <= Utc::now() => {
                sessions.remove(&id);
                Ok(false)
            }
            Some(session) => Ok(session.user_id == user_id),
            None => Ok(false),
        }
    }

    async fn revoke(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, live| live.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;
