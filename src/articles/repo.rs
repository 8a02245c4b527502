use anyhow::Context;
use sqlx::SqlitePool;

use crate::articles::repo_types::Article;

impl Article {
    /// All articles in insertion order.
    pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, user_id, is_verified
            FROM article
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await
        .context("list articles")?;
        Ok(rows)
    }

    /// Articles whose title or body contains `query` (case-sensitive).
    pub async fn search(db: &SqlitePool, query: &str) -> anyhow::Result<Vec<Article>> {
        if query.is_empty() {
            return Self::list_all(db).await;
        }
        // instr() is case-sensitive and has no wildcard characters, unlike LIKE.
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, user_id, is_verified
            FROM article
            WHERE instr(title, ?1) > 0 OR instr(coalesce(body, ''), ?1) > 0
            ORDER BY id
            "#,
        )
        .bind(query)
        .fetch_all(db)
        .await
        .context("search articles")?;
        Ok(rows)
    }

    pub async fn list_by_owner(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, user_id, is_verified
            FROM article
            WHERE user_id = ?1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list articles by owner")?;
        Ok(rows)
    }

    pub async fn get(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, user_id, is_verified
            FROM article
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get article")?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        title: &str,
        body: Option<&str>,
        is_verified: bool,
        owner_id: i64,
    ) -> anyhow::Result<Article> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO article (title, body, is_verified, user_id)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, title, body, user_id, is_verified
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(is_verified)
        .bind(owner_id)
        .fetch_one(db)
        .await
        .context("insert article")?;
        Ok(row)
    }

    /// Replaces title, body and the verified flag. The owner is left as is.
    /// Returns `None` when no article has this id.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        title: &str,
        body: Option<&str>,
        is_verified: bool,
    ) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            UPDATE article
            SET title = ?2, body = ?3, is_verified = ?4
            WHERE id = ?1
            RETURNING id, title, body, user_id, is_verified
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(is_verified)
        .fetch_optional(db)
        .await
        .context("update article")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::User, state::AppState};

    async fn user(state: &AppState, name: &str) -> User {
        User::create(&state.db, name, None, "hash").await.unwrap()
    }

    #[tokio::test]
    async fn create_then_get() {
        let state = AppState::fake().await;
        let u1 = user(&state, "u1").await;
        let created = Article::create(&state.db, "Hello", Some("World"), false, u1.id)
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let fetched = Article::get(&state.db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Hello");
        assert_eq!(fetched.body.as_deref(), Some("World"));
        assert!(!fetched.is_verified);
        assert_eq!(fetched.user_id, u1.id);

        assert!(Article::get(&state.db, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_title_or_body_case_sensitively() {
        let state = AppState::fake().await;
        let u1 = user(&state, "u1").await;
        let hello = Article::create(&state.db, "Hello", Some("World"), false, u1.id)
            .await
            .unwrap();
        let rust = Article::create(&state.db, "Rust notes", None, true, u1.id)
            .await
            .unwrap();
        let pct = Article::create(&state.db, "100% sure", Some("a_b"), false, u1.id)
            .await
            .unwrap();

        let ids = |v: Vec<Article>| v.into_iter().map(|a| a.id).collect::<Vec<_>>();

        assert_eq!(ids(Article::search(&state.db, "Wor").await.unwrap()), vec![hello.id]);
        assert_eq!(ids(Article::search(&state.db, "zzz").await.unwrap()), Vec::<i64>::new());
        assert_eq!(ids(Article::search(&state.db, "wor").await.unwrap()), Vec::<i64>::new());
        assert_eq!(ids(Article::search(&state.db, "notes").await.unwrap()), vec![rust.id]);
        assert_eq!(ids(Article::search(&state.db, "%").await.unwrap()), vec![pct.id]);
        assert_eq!(ids(Article::search(&state.db, "_").await.unwrap()), vec![pct.id]);
        assert_eq!(
            ids(Article::search(&state.db, "").await.unwrap()),
            vec![hello.id, rust.id, pct.id]
        );
        assert_eq!(
            ids(Article::search(&state.db, "").await.unwrap()),
            ids(Article::list_all(&state.db).await.unwrap())
        );
    }

    #[tokio::test]
    async fn update_keeps_owner() {
        let state = AppState::fake().await;
        let u1 = user(&state, "u1").await;
        let a = Article::create(&state.db, "Draft", Some("text"), false, u1.id)
            .await
            .unwrap();

        let updated = Article::update(&state.db, a.id, "Final", None, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.body, None);
        assert!(updated.is_verified);
        assert_eq!(updated.user_id, u1.id);
        assert_eq!(Article::get(&state.db, a.id).await.unwrap().unwrap(), updated);

        assert!(Article::update(&state.db, 404, "x", None, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn articles_by_owner() {
        let state = AppState::fake().await;
        let u1 = user(&state, "u1").await;
        let u2 = user(&state, "u2").await;
        let a = Article::create(&state.db, "one", None, false, u1.id).await.unwrap();
        Article::create(&state.db, "two", None, false, u2.id).await.unwrap();
        let c = Article::create(&state.db, "three", None, false, u1.id).await.unwrap();

        let mine: Vec<i64> = Article::list_by_owner(&state.db, u1.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(mine, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn owner_must_exist() {
        let state = AppState::fake().await;
        assert!(Article::create(&state.db, "orphan", None, false, 12345).await.is_err());
    }
}
