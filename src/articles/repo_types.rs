use sqlx::FromRow;

/// Article record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: Option<String>,
    pub user_id: i64, // owner, fixed at creation
    pub is_verified: bool,
}
