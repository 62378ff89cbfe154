use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub barcode: Option<String>,
    pub serving_size_grams: f64,
    pub product_name: String,
    #[serde(default)]
    pub nutriments: HashMap<String, f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMealResponse {
    pub ok: bool,
    pub meal_id: i64,
}

/// Full meal as returned by the listing endpoint; unlike the aggregated
/// view this carries the raw creation timestamp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealListItem {
    pub meal_id: i64,
    pub barcode: Option<String>,
    pub serving_size_grams: f64,
    pub product_name: String,
    pub nutriments: HashMap<String, f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServingRequest {
    #[serde(default)]
    pub meal_ids: Vec<i64>,
    pub serving_size_grams: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMealsRequest {
    #[serde(default)]
    pub meal_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn create_request_defaults_nutriments_to_empty() {
        let req: CreateMealRequest = serde_json::from_str(
            r#"{"servingSizeGrams": 150, "productName": "Banana"}"#,
        )
        .unwrap();
        assert!(req.nutriments.is_empty());
        assert!(req.barcode.is_none());
        assert_eq!(req.serving_size_grams, 150.0);
    }

    #[test]
    fn list_item_uses_camel_case_and_rfc3339() {
        let item = MealListItem {
            meal_id: 3,
            barcode: Some("demo".into()),
            serving_size_grams: 80.0,
            product_name: "Oatmeal".into(),
            nutriments: HashMap::new(),
            created_at: datetime!(2025-08-25 08:30 UTC),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"mealId\":3"));
        assert!(json.contains("\"servingSizeGrams\":80.0"));
        assert!(json.contains("\"createdAt\":\"2025-08-25T08:30:00Z\""));
    }

    #[test]
    fn batch_requests_tolerate_missing_fields() {
        let upd: UpdateServingRequest = serde_json::from_str("{}").unwrap();
        assert!(upd.meal_ids.is_empty());
        assert!(upd.serving_size_grams.is_none());

        let del: DeleteMealsRequest = serde_json::from_str("{}").unwrap();
        assert!(del.meal_ids.is_empty());
    }
}
