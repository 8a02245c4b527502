use std::time::Duration;

use axum::{extract::FromRef, http::HeaderValue};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::{SessionConfig, MAX_SESSION_TTL_MINUTES},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "session";

/// Something a session can be tagged with.
pub trait Identity {
    fn id(&self) -> i64;

    /// Value stored in the session token to find this identity again.
    fn session_key(&self) -> String {
        self.id().to_string()
    }
}

/// Per-request authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(i64),
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(id) => Some(*id),
        }
    }
}

/// Payload of the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Identity::session_key
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
    pub jti: Uuid,    // token id
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl From<&SessionConfig> for SessionKeys {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(
                cfg.ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES) as u64 * 60,
            ),
            cookie_secure: cfg.cookie_secure,
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::from(&state.config.session)
    }
}

impl SessionKeys {
    /// Signs a session token tagging the holder with `identity`.
    pub fn issue<I: Identity>(&self, identity: &I) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: identity.session_key(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = identity.id(), jti = %claims.jti, "session issued");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Maps a token to a session state. Anything unverifiable is anonymous.
    pub fn resolve(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::Anonymous;
        };
        match self.verify(token) {
            Ok(claims) => match claims.sub.parse::<i64>() {
                Ok(id) => Session::Authenticated(id),
                Err(_) => {
                    debug!(jti = %claims.jti, "session subject is not a user id");
                    Session::Anonymous
                }
            },
            Err(e) => {
                debug!(error = %e, "ignoring invalid session token");
                Session::Anonymous
            }
        }
    }

    pub fn login_cookie(&self, token: &str) -> anyhow::Result<HeaderValue> {
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        let cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            self.ttl.as_secs()
        );
        Ok(HeaderValue::from_str(&cookie)?)
    }

    pub fn logout_cookie(&self) -> HeaderValue {
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        let cookie =
            format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure}");
        HeaderValue::from_str(&cookie)
            .unwrap_or_else(|_| HeaderValue::from_static("session=; Max-Age=0"))
    }
}

/// Reads a cookie value out of a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name && !v.is_empty()).then_some(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(i64);

    impl Identity for Fixed {
        fn id(&self) -> i64 {
            self.0
        }
    }

    fn keys(secret: &str, issuer: &str, audience: &str) -> SessionKeys {
        SessionKeys::from(&SessionConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
            cookie_secure: false,
        })
    }

    #[test]
    fn issue_and_resolve_session() {
        let keys = keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.issue(&Fixed(42)).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(keys.resolve(Some(&token)), Session::Authenticated(42));
    }

    #[test]
    fn missing_or_garbage_token_is_anonymous() {
        let keys = keys("dev-secret", "iss", "aud");
        assert_eq!(keys.resolve(None), Session::Anonymous);
        assert_eq!(keys.resolve(Some("not-a-jwt")), Session::Anonymous);
    }

    #[test]
    fn token_from_other_secret_or_audience_is_anonymous() {
        let good = keys("same-secret", "good-iss", "good-aud");
        let other_aud = keys("same-secret", "good-iss", "bad-aud");
        let other_secret = keys("other-secret", "good-iss", "good-aud");
        let token = good.issue(&Fixed(7)).expect("issue");
        assert!(other_aud.verify(&token).is_err());
        assert_eq!(other_aud.resolve(Some(&token)), Session::Anonymous);
        assert_eq!(other_secret.resolve(Some(&token)), Session::Anonymous);
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let keys = SessionKeys::from(&SessionConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: i64::MAX,
            cookie_secure: false,
        });
        assert_eq!(keys.ttl.as_secs(), (MAX_SESSION_TTL_MINUTES * 60) as u64);
        let token = keys.issue(&Fixed(1)).expect("issue");
        assert_eq!(keys.resolve(Some(&token)), Session::Authenticated(1));
    }

    #[test]
    fn cookie_parsing() {
        let header = "theme=dark; session=abc.def.ghi; other=1";
        assert_eq!(cookie_value(header, "session"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("session=", "session"), None);
    }

    #[test]
    fn login_and_logout_cookies() {
        let keys = keys("s", "i", "a");
        let set = keys.login_cookie("tok").unwrap();
        let set = set.to_str().unwrap();
        assert!(set.starts_with("session=tok;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("Max-Age=300"));
        assert!(!set.contains("Secure"));
        assert!(keys.logout_cookie().to_str().unwrap().contains("Max-Age=0"));
    }
}
