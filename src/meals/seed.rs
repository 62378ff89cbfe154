use std::collections::HashMap;

use rand::Rng;
use sqlx::{types::Json, PgPool};
use time::{Duration, OffsetDateTime, Time};
use tracing::info;

use crate::meals::{days::local_now, repo::Meal};

pub const DEMO_BARCODE: &str = "demo";
const SEED_COUNT: usize = 100;
const SERVING_CHOICES: [f64; 8] = [80.0, 100.0, 120.0, 150.0, 180.0, 200.0, 250.0, 300.0];

/// Per-100g nutrient profiles for the demo catalog.
type Profile = [(&'static str, f64); 4];

const CATALOG: [(&str, Profile); 22] = [
    ("Greek Yogurt", [("energy-kcal_100g", 59.0), ("proteins_100g", 10.0), ("fat_100g", 0.4), ("carbohydrates_100g", 3.6)]),
    ("Chicken Breast", [("energy-kcal_100g", 165.0), ("proteins_100g", 31.0), ("fat_100g", 3.6), ("carbohydrates_100g", 0.0)]),
    ("Oatmeal", [("energy-kcal_100g", 389.0), ("proteins_100g", 17.0), ("fat_100g", 7.0), ("carbohydrates_100g", 66.0)]),
    ("Banana", [("energy-kcal_100g", 89.0), ("proteins_100g", 1.1), ("fat_100g", 0.3), ("carbohydrates_100g", 23.0)]),
    ("Avocado", [("energy-kcal_100g", 160.0), ("proteins_100g", 2.0), ("fat_100g", 14.7), ("carbohydrates_100g", 8.5)]),
    ("Salmon", [("energy-kcal_100g", 208.0), ("proteins_100g", 20.0), ("fat_100g", 13.0), ("carbohydrates_100g", 0.0)]),
    ("Brown Rice", [("energy-kcal_100g", 111.0), ("proteins_100g", 2.6), ("fat_100g", 0.9), ("carbohydrates_100g", 23.0)]),
    ("Almonds", [("energy-kcal_100g", 579.0), ("proteins_100g", 21.0), ("fat_100g", 50.0), ("carbohydrates_100g", 22.0)]),
    ("Egg Whites", [("energy-kcal_100g", 52.0), ("proteins_100g", 11.0), ("fat_100g", 0.2), ("carbohydrates_100g", 0.7)]),
    ("Tuna (Canned in water, drained)", [("energy-kcal_100g", 116.0), ("proteins_100g", 26.0), ("fat_100g", 1.0), ("carbohydrates_100g", 0.0)]),
    ("Sweet Potato (baked)", [("energy-kcal_100g", 90.0), ("proteins_100g", 2.0), ("fat_100g", 0.1), ("carbohydrates_100g", 21.0)]),
    ("Black Beans (cooked)", [("energy-kcal_100g", 132.0), ("proteins_100g", 8.9), ("fat_100g", 0.5), ("carbohydrates_100g", 23.7)]),
    ("Tofu (firm)", [("energy-kcal_100g", 144.0), ("proteins_100g", 15.7), ("fat_100g", 8.7), ("carbohydrates_100g", 2.3)]),
    ("Cottage Cheese (low-fat 1%)", [("energy-kcal_100g", 72.0), ("proteins_100g", 12.4), ("fat_100g", 1.0), ("carbohydrates_100g", 3.4)]),
    ("Turkey Breast (skinless, roasted)", [("energy-kcal_100g", 135.0), ("proteins_100g", 29.0), ("fat_100g", 1.6), ("carbohydrates_100g", 0.0)]),
    ("Ground Beef (93% lean, cooked)", [("energy-kcal_100g", 176.0), ("proteins_100g", 26.0), ("fat_100g", 8.0), ("carbohydrates_100g", 0.0)]),
    ("Cod (baked)", [("energy-kcal_100g", 105.0), ("proteins_100g", 23.0), ("fat_100g", 1.0), ("carbohydrates_100g", 0.0)]),
    ("Quinoa (cooked)", [("energy-kcal_100g", 120.0), ("proteins_100g", 4.4), ("fat_100g", 1.9), ("carbohydrates_100g", 21.3)]),
    ("Whole Wheat Bread", [("energy-kcal_100g", 247.0), ("proteins_100g", 13.0), ("fat_100g", 4.2), ("carbohydrates_100g", 41.0)]),
    ("Pasta (cooked)", [("energy-kcal_100g", 158.0), ("proteins_100g", 5.8), ("fat_100g", 0.9), ("carbohydrates_100g", 31.0)]),
    ("Peanut Butter (natural)", [("energy-kcal_100g", 588.0), ("proteins_100g", 25.0), ("fat_100g", 50.0), ("carbohydrates_100g", 20.0)]),
    ("Cheddar Cheese", [("energy-kcal_100g", 403.0), ("proteins_100g", 25.0), ("fat_100g", 33.0), ("carbohydrates_100g", 1.3)]),
];

#[derive(Debug)]
pub struct SeedMeal {
    pub barcode: &'static str,
    pub product_name: &'static str,
    pub nutriments: HashMap<String, f64>,
    pub serving_size_grams: f64,
    pub created_at: OffsetDateTime,
}

/// Draws 100 synthetic meals: catalog items with repetition, a plausible
/// serving size, and a timestamp within the past 29 days at a daytime hour.
pub fn build_seed_plan(now: OffsetDateTime, rng: &mut impl Rng) -> anyhow::Result<Vec<SeedMeal>> {
    let mut plan = Vec::with_capacity(SEED_COUNT);
    for _ in 0..SEED_COUNT {
        let (name, profile) = CATALOG[rng.gen_range(0..CATALOG.len())];
        let serving = SERVING_CHOICES[rng.gen_range(0..SERVING_CHOICES.len())];
        let days_ago = rng.gen_range(0..=29);
        let hour = rng.gen_range(6..=20u8);
        let minute = rng.gen_range(0..=59u8);
        let created_at =
            (now - Duration::days(days_ago)).replace_time(Time::from_hms(hour, minute, 0)?);
        plan.push(SeedMeal {
            barcode: DEMO_BARCODE,
            product_name: name,
            nutriments: profile.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            serving_size_grams: serving,
            created_at,
        });
    }
    Ok(plan)
}

/// Replaces all meals of `user_id` with a fresh synthetic history. Runs in
/// one transaction so a failure never leaves the account half-seeded.
pub async fn seed_demo_meals(db: &PgPool, user_id: i64) -> anyhow::Result<()> {
    let plan = build_seed_plan(local_now(), &mut rand::thread_rng())?;

    let mut tx = db.begin().await?;
    Meal::delete_all(&mut *tx, user_id).await?;
    for m in &plan {
        sqlx::query(
            r#"
            INSERT INTO meals (user_id, barcode, serving_size_grams, product_name, nutriments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(m.barcode)
        .bind(m.serving_size_grams)
        .bind(m.product_name)
        .bind(Json(&m.nutriments))
        .bind(m.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(user_id = %user_id, count = plan.len(), "demo meals seeded");
    Ok(())
}
