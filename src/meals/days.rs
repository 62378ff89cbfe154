use std::collections::HashMap;

use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, Date, Duration, OffsetDateTime};

use crate::meals::repo::Meal;

/// Size of the aggregation window in calendar days, today included.
pub const WINDOW_DAYS: i64 = 30;

/// Display label, e.g. "05 Mar". The year is deliberately absent from the
/// label but buckets are keyed on the full date, so meals logged on the same
/// day and month of different years never share a bucket.
const LABEL_FORMAT: &[FormatItem<'static>] = format_description!("[day] [month repr:short]");

#[derive(Debug, Serialize)]
pub struct DayMeal {
    #[serde(rename = "mealId")]
    pub meal_id: i64,
    #[serde(rename = "servingSizeGrams")]
    pub serving_size_grams: f64,
    pub date: String,
    pub nutriments: HashMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct DayBucket {
    pub date: String,
    pub meals: Vec<DayMeal>,
}

/// Wall-clock "now" used to anchor the window. Falls back to UTC when the
/// platform cannot determine the local offset (common in containers).
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Local midnight of the first day in the window, for the store prefilter.
pub fn window_start(now: OffsetDateTime) -> OffsetDateTime {
    (now.date() - Duration::days(WINDOW_DAYS - 1))
        .midnight()
        .assume_offset(now.offset())
}

pub fn day_label(date: Date) -> anyhow::Result<String> {
    Ok(date.format(LABEL_FORMAT)?)
}

/// Groups `meals` by local calendar day over `[today - 29, today]`.
///
/// Always returns exactly [`WINDOW_DAYS`] buckets in ascending date order;
/// days without meals carry an empty list. Meals keep their input order
/// (callers pass them sorted by creation time ascending). Meals whose local
/// date falls outside the window are dropped.
///
/// Every timestamp is interpreted in `now`'s offset, a single fixed value
/// for the whole window. Around a DST transition a meal logged within the
/// offset delta of midnight can land on the neighbouring day; resolving the
/// offset per timestamp would need a platform tz lookup that is unavailable
/// in the environments this runs in (see [`local_now`]).
pub fn bucket_days(now: OffsetDateTime, meals: &[Meal]) -> anyhow::Result<Vec<DayBucket>> {
    let today = now.date();
    let start = today - Duration::days(WINDOW_DAYS - 1);

    let mut dates = Vec::with_capacity(WINDOW_DAYS as usize);
    let mut index: HashMap<Date, usize> = HashMap::with_capacity(WINDOW_DAYS as usize);
    for i in 0..WINDOW_DAYS {
        let date = start + Duration::days(i);
        index.insert(date, dates.len());
        dates.push(date);
    }

    let mut grouped: Vec<Vec<DayMeal>> = (0..WINDOW_DAYS).map(|_| Vec::new()).collect();
    for meal in meals {
        let local_date = meal.created_at.to_offset(now.offset()).date();
        let Some(&i) = index.get(&local_date) else {
            continue;
        };
        grouped[i].push(DayMeal {
            meal_id: meal.id,
            serving_size_grams: meal.serving_size_grams,
            date: day_label(local_date)?,
            nutriments: meal.nutriments.0.clone(),
        });
    }

    let mut days = Vec::with_capacity(WINDOW_DAYS as usize);
    for (date, meals) in dates.into_iter().zip(grouped) {
        days.push(DayBucket {
            date: day_label(date)?,
            meals,
        });
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use time::macros::{date, datetime};

    fn meal(id: i64, created_at: OffsetDateTime) -> Meal {
        Meal {
            id,
            user_id: 1,
            barcode: None,
            serving_size_grams: 100.0,
            product_name: format!("product-{id}"),
            nutriments: Json(HashMap::from([("energy-kcal_100g".to_string(), 89.0)])),
            created_at,
        }
    }

    #[test]
    fn label_is_two_digit_day_and_short_month() {
        assert_eq!(day_label(date!(2025 - 03 - 05)).unwrap(), "05 Mar");
        assert_eq!(day_label(date!(2025 - 12 - 31)).unwrap(), "31 Dec");
    }

    #[test]
    fn returns_exactly_30_days_ascending_even_when_empty() {
        let now = datetime!(2025-08-25 12:00 UTC);
        let days = bucket_days(now, &[]).unwrap();
        assert_eq!(days.len(), 30);
        assert!(days.iter().all(|d| d.meals.is_empty()));
        assert_eq!(days[0].date, "27 Jul");
        assert_eq!(days[29].date, "25 Aug");
    }

    #[test]
    fn window_start_is_local_midnight_29_days_back() {
        let now = datetime!(2025-08-25 15:30 +2);
        let start = window_start(now);
        assert_eq!(start, datetime!(2025-07-27 00:00 +2));
    }

    #[test]
    fn groups_meals_into_their_calendar_day() {
        let now = datetime!(2025-08-25 18:00 UTC);
        // A and B today, C five days ago, in creation order.
        let meals = vec![
            meal(1, datetime!(2025-08-20 13:00 UTC)),
            meal(2, datetime!(2025-08-25 08:00 UTC)),
            meal(3, datetime!(2025-08-25 12:30 UTC)),
        ];
        let days = bucket_days(now, &meals).unwrap();

        let today = &days[29];
        assert_eq!(today.date, "25 Aug");
        assert_eq!(
            today.meals.iter().map(|m| m.meal_id).collect::<Vec<_>>(),
            vec![2, 3]
        );

        let five_ago = &days[24];
        assert_eq!(five_ago.date, "20 Aug");
        assert_eq!(five_ago.meals.len(), 1);
        assert_eq!(five_ago.meals[0].meal_id, 1);

        let total: usize = days.iter().map(|d| d.meals.len()).sum();
        assert_eq!(total, 3);
        for (i, d) in days.iter().enumerate() {
            if i != 24 && i != 29 {
                assert!(d.meals.is_empty(), "day {i} should be empty");
            }
        }
    }

    #[test]
    fn oldest_window_day_is_included_and_older_meals_are_not() {
        let now = datetime!(2025-08-25 12:00 UTC);
        let meals = vec![
            meal(1, datetime!(2025-07-26 23:59 UTC)), // 30 days back, outside
            meal(2, datetime!(2025-07-27 00:01 UTC)), // 29 days back, inside
        ];
        let days = bucket_days(now, &meals).unwrap();
        assert_eq!(days[0].meals.len(), 1);
        assert_eq!(days[0].meals[0].meal_id, 2);
        let total: usize = days.iter().map(|d| d.meals.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn day_boundaries_follow_the_local_offset() {
        // 23:30 UTC on Aug 24 is already Aug 25 at +02:00.
        let now = datetime!(2025-08-25 09:00 +2);
        let meals = vec![meal(1, datetime!(2025-08-24 23:30 UTC))];
        let days = bucket_days(now, &meals).unwrap();
        assert_eq!(days[29].date, "25 Aug");
        assert_eq!(days[29].meals.len(), 1);
    }

    #[test]
    fn year_boundary_labels_do_not_merge() {
        // Window spans 2025-12-12 .. 2026-01-10. A meal from 2025-01-05
        // shares the "05 Jan" label with 2026-01-05 but must not land in
        // that bucket.
        let now = datetime!(2026-01-10 12:00 UTC);
        let meals = vec![
            meal(1, datetime!(2025-01-05 10:00 UTC)),
            meal(2, datetime!(2026-01-05 10:00 UTC)),
        ];
        let days = bucket_days(now, &meals).unwrap();

        let jan5: Vec<_> = days.iter().filter(|d| d.date == "05 Jan").collect();
        assert_eq!(jan5.len(), 1);
        assert_eq!(jan5[0].meals.len(), 1);
        assert_eq!(jan5[0].meals[0].meal_id, 2);

        let total: usize = days.iter().map(|d| d.meals.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn meal_carries_its_label_and_nutriments() {
        let now = datetime!(2025-08-25 12:00 UTC);
        let meals = vec![meal(7, datetime!(2025-08-25 08:00 UTC))];
        let days = bucket_days(now, &meals).unwrap();
        let m = &days[29].meals[0];
        assert_eq!(m.date, "25 Aug");
        assert_eq!(m.nutriments.get("energy-kcal_100g"), Some(&89.0));
    }

    #[test]
    fn bucket_serializes_with_camel_case_meal_fields() {
        let now = datetime!(2025-08-25 12:00 UTC);
        let meals = vec![meal(7, datetime!(2025-08-25 08:00 UTC))];
        let days = bucket_days(now, &meals).unwrap();
        let json = serde_json::to_string(&days[29]).unwrap();
        assert!(json.contains("\"mealId\":7"));
        assert!(json.contains("\"servingSizeGrams\":100.0"));
        assert!(json.contains("\"date\":\"25 Aug\""));
    }
}
