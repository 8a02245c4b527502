use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::NewUser,
        password::{verify_password, PasswordScheme},
        repo::is_unique_violation,
        repo_types::User,
    },
    error::AppError,
};

/// Creates a user after checking that neither the username nor the email is taken.
///
/// The check and the insert are separate statements; the UNIQUE constraints
/// catch a concurrent registration that slips between them.
pub async fn register(
    db: &SqlitePool,
    scheme: PasswordScheme,
    new_user: &NewUser,
) -> Result<User, AppError> {
    if User::find_by_username(db, &new_user.username).await?.is_some() {
        warn!(username = %new_user.username, "username already registered");
        return Err(AppError::DuplicateIdentity);
    }
    if let Some(email) = new_user.email.as_deref() {
        if User::find_by_email(db, email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::DuplicateIdentity);
        }
    }

    let hash = scheme.hash(&new_user.password)?;
    let email = new_user.email.as_deref();
    let created = User::create(db, &new_user.username, email, &hash).await;
    let user = match created {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(username = %new_user.username, "registration lost a uniqueness race");
            return Err(AppError::DuplicateIdentity);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Looks a user up by exact username and checks the password.
pub async fn authenticate(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = User::find_by_username(db, username).await? else {
        warn!(username = %username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}
