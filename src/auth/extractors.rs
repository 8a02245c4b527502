use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;
use tracing::warn;

use super::{
    repo_types::User,
    session::{cookie_value, Session, SessionKeys, SESSION_COOKIE},
};
use crate::{error::AppError, state::AppState};

/// Session token from the session cookie, or from a `Bearer` header.
fn session_token(parts: &Parts) -> Option<&str> {
    let from_cookie = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|h| cookie_value(h, SESSION_COOKIE));
    if from_cookie.is_some() {
        return from_cookie;
    }
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(keys.resolve(session_token(parts)))
    }
}

/// The logged-in user, if any.
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub async fn resolve(state: &AppState, session: Session) -> Result<Self, AppError> {
        let Some(id) = session.user_id() else {
            return Ok(CurrentUser(None));
        };
        let user = User::find_by_id(&state.db, id).await?;
        if user.is_none() {
            warn!(user_id = id, "session refers to a missing user");
        }
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .unwrap_or(Session::Anonymous);
        CurrentUser::resolve(state, session).await
    }
}

/// Gate for actions that need a logged-in user. Anonymous requests are
/// rejected with [`AppError::Unauthenticated`] before the handler runs.
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".into());
                Err(AppError::Unauthenticated { next })
            }
        }
    }
}
