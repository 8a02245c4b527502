use serde::Deserialize;
use tracing::warn;

use crate::auth::password::PasswordScheme;

const DEV_SECRET_KEY: &str = "you-will-never-guess";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60 * 24 * 14;
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Session lifetime from `SESSION_TTL_MINUTES`, kept within one minute and one year.
fn session_ttl_minutes(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(v) if v > 0 => v.min(MAX_SESSION_TTL_MINUTES),
        Some(_) => 1,
        None => DEFAULT_SESSION_TTL_MINUTES,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub password_scheme: PasswordScheme,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://articles.db?mode=rwc".into());

        let secret = match std::env::var("SECRET_KEY") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("SECRET_KEY not set; using the development key");
                DEV_SECRET_KEY.into()
            }
        };

        let ttl = std::env::var("SESSION_TTL_MINUTES").ok();
        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER")
                .unwrap_or_else(|_| "articles".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "articles-web".into()),
            ttl_minutes: session_ttl_minutes(ttl.as_deref()),
            cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        let password_scheme = match std::env::var("PASSWORD_SCHEME") {
            Ok(v) => v.parse::<PasswordScheme>()?,
            Err(_) => PasswordScheme::default(),
        };

        Ok(Self {
            database_url,
            session,
            password_scheme,
        })
    }
}
