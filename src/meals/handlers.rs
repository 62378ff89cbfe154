use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    meals::{
        days::{bucket_days, local_now, window_start, DayBucket},
        dto::{
            CreateMealRequest, CreatedMealResponse, DeleteMealsRequest, MealListItem, OkResponse,
            UpdateServingRequest,
        },
        repo::Meal,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/recent", get(recent_days))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal).delete(delete_meals))
        .route("/meals/serving", patch(update_serving))
}

fn ensure_update_batch(payload: &UpdateServingRequest) -> Result<f64, ApiError> {
    match payload.serving_size_grams {
        Some(grams) if !payload.meal_ids.is_empty() => Ok(grams),
        _ => Err(ApiError::InvalidArgument(
            "mealIds and servingSizeGrams are required".into(),
        )),
    }
}

fn ensure_delete_batch(payload: &DeleteMealsRequest) -> Result<(), ApiError> {
    if payload.meal_ids.is_empty() {
        return Err(ApiError::InvalidArgument("mealIds are required".into()));
    }
    Ok(())
}

/// The last 30 calendar days, oldest first, one entry per day.
#[instrument(skip(state))]
pub async fn recent_days(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DayBucket>>, ApiError> {
    let now = local_now();
    let meals = Meal::list_since(&state.db, user_id, window_start(now)).await?;
    let days = bucket_days(now, &meals)?;
    Ok(Json(days))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealListItem>>, ApiError> {
    let meals = Meal::list_by_user(&state.db, user_id).await?;
    let items = meals
        .into_iter()
        .map(|m| MealListItem {
            meal_id: m.id,
            barcode: m.barcode,
            serving_size_grams: m.serving_size_grams,
            product_name: m.product_name,
            nutriments: m.nutriments.0,
            created_at: m.created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<CreatedMealResponse>), ApiError> {
    let meal_id = Meal::create(
        &state.db,
        user_id,
        payload.barcode.as_deref(),
        payload.serving_size_grams,
        &payload.product_name,
        &payload.nutriments,
    )
    .await?;

    info!(user_id = %user_id, meal_id = %meal_id, product = %payload.product_name, "meal logged");
    Ok((
        StatusCode::CREATED,
        Json(CreatedMealResponse { ok: true, meal_id }),
    ))
}

/// Batch serving-size update. Ids not owned by the caller are filtered out
/// by the store, and the call succeeds regardless of how many rows matched.
#[instrument(skip(state, payload))]
pub async fn update_serving(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateServingRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let grams = ensure_update_batch(&payload)?;
    let updated = Meal::update_serving(&state.db, user_id, &payload.meal_ids, grams).await?;
    debug!(user_id = %user_id, requested = payload.meal_ids.len(), updated, "serving sizes updated");
    Ok(Json(OkResponse { ok: true }))
}

#[instrument(skip(state, payload))]
pub async fn delete_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DeleteMealsRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    ensure_delete_batch(&payload)?;
    let deleted = Meal::delete(&state.db, user_id, &payload.meal_ids).await?;
    debug!(user_id = %user_id, requested = payload.meal_ids.len(), deleted, "meals deleted");
    Ok(Json(OkResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_batch_rejects_empty_ids() {
        let payload = UpdateServingRequest {
            meal_ids: vec![],
            serving_size_grams: Some(150.0),
        };
        assert!(matches!(
            ensure_update_batch(&payload),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_batch_rejects_missing_serving_size() {
        let payload = UpdateServingRequest {
            meal_ids: vec![1, 2],
            serving_size_grams: None,
        };
        assert!(matches!(
            ensure_update_batch(&payload),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_batch_accepts_ids_and_serving_size() {
        let payload = UpdateServingRequest {
            meal_ids: vec![1],
            serving_size_grams: Some(150.0),
        };
        assert_eq!(ensure_update_batch(&payload).unwrap(), 150.0);
    }

    #[test]
    fn delete_batch_rejects_empty_ids() {
        let payload = DeleteMealsRequest { meal_ids: vec![] };
        assert!(matches!(
            ensure_delete_batch(&payload),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn delete_batch_accepts_non_empty_ids() {
        let payload = DeleteMealsRequest { meal_ids: vec![9] };
        assert!(ensure_delete_batch(&payload).is_ok());
    }
}
