use std::env;
use thiserror::Error;

/// Fallback signing secret for session cookies outside production.
const LOCAL_SESSION_SECRET: &str = "blog-api-local-session-secret-value";

/// ConfigError
///
/// Raised by [`AppConfig::load`] when the environment cannot produce a usable configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and pulled
/// into handlers and extractors via `FromRef`, as part of the shared `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format and which secrets are mandatory.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory stores.
    pub db_url: Option<String>,
    // HMAC secret used to sign and verify session cookies.
    pub session_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Lifetime of a session established by signin.
    pub session_ttl_hours: i64,
    // When false, state-changing requests skip the anti-forgery token check.
    pub csrf_enforce: bool,
}

/// Env
///
/// Defines the runtime context: local development or hardened production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for tests: in-memory stores, CSRF checks on.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            session_ttl_hours: 24,
            csrf_enforce: true,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables. Production refuses to start
    /// without `DATABASE_URL` and `SESSION_SECRET`; local mode falls back to in-memory
    /// storage and a fixed development secret.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let session_secret = env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty());

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(db_url.ok_or(ConfigError::Missing("DATABASE_URL"))?),
                session_secret.ok_or(ConfigError::Missing("SESSION_SECRET"))?,
            ),
            Env::Local => (
                db_url,
                session_secret.unwrap_or_else(|| LOCAL_SESSION_SECRET.to_string()),
            ),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_TTL_HOURS",
                        value: raw,
                    });
                }
            },
            Err(_) => 24,
        };

        let csrf_enforce = match env::var("CSRF_ENFORCE") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: "CSRF_ENFORCE",
                value: raw,
            })?,
            Err(_) => true,
        };

        Ok(Self {
            env,
            db_url,
            session_secret,
            bind_addr,
            session_ttl_hours,
            csrf_enforce,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
