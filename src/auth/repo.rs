use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub goal: i64,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, goal, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, goal, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        goal: i64,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, goal)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, goal, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(goal)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn set_goal(db: &PgPool, user_id: i64, goal: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET goal = $1 WHERE id = $2")
            .bind(goal)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
