use sqlx::FromRow;

use crate::auth::session::Identity;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String, // stored in the `password` column
}

impl Identity for User {
    fn id(&self) -> i64 {
        self.id
    }
}
