use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;

/// A logged meal. Nutrient values are per 100g and schema-free: clients pass
/// whatever keys they have ("energy-kcal_100g", "proteins_100g", ...) and we
/// store them verbatim as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    pub barcode: Option<String>,
    pub serving_size_grams: f64,
    pub product_name: String,
    pub nutriments: Json<HashMap<String, f64>>,
    pub created_at: OffsetDateTime,
}

impl Meal {
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        barcode: Option<&str>,
        serving_size_grams: f64,
        product_name: &str,
        nutriments: &HashMap<String, f64>,
    ) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO meals (user_id, barcode, serving_size_grams, product_name, nutriments)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(barcode)
        .bind(serving_size_grams)
        .bind(product_name)
        .bind(Json(nutriments))
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, barcode, serving_size_grams, product_name, nutriments, created_at
            FROM meals
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Meals created at or after `since`, oldest first. Used by the
    /// recent-days aggregation; the exact calendar-day cut happens in
    /// `days::bucket_days`.
    pub async fn list_since(
        db: &PgPool,
        user_id: i64,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, barcode, serving_size_grams, product_name, nutriments, created_at
            FROM meals
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Sets the serving size on every id in `meal_ids` that belongs to
    /// `user_id`. Ids owned by someone else simply do not match the WHERE
    /// clause; that is intentional, not an error.
    pub async fn update_serving(
        db: &PgPool,
        user_id: i64,
        meal_ids: &[i64],
        serving_size_grams: f64,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE meals
            SET serving_size_grams = $1
            WHERE user_id = $2 AND id = ANY($3)
            "#,
        )
        .bind(serving_size_grams)
        .bind(user_id)
        .bind(meal_ids)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes every meal of `user_id`. Takes any executor so the demo
    /// seeder can run it inside its transaction.
    pub async fn delete_all<'e, E>(db: E, user_id: i64) -> anyhow::Result<u64>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM meals WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deletes every id in `meal_ids` owned by `user_id`; same silent
    /// ownership filter as `update_serving`.
    pub async fn delete(db: &PgPool, user_id: i64, meal_ids: &[i64]) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM meals
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(meal_ids)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}
