use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    meals::{dto::SaveMealRequest, repo::MealPlanEntry},
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(save_meal))
        .route("/meals", get(list_meals))
        .route("/meals/:id", delete(delete_meal))
}

#[instrument(skip(state, payload))]
pub async fn save_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveMealRequest>,
) -> Result<Json<MealPlanEntry>, ApiError> {
    let stored = state.meals.create(user_id, payload).await?;
    info!(user_id = %user_id, meal_id = %stored.id, date = %stored.date, "meal saved");
    Ok(Json(stored))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealPlanEntry>>, ApiError> {
    let meals = state.meals.list_by_owner(user_id).await?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.meals.delete_by_id(id, user_id).await?;
    info!(user_id = %user_id, meal_id = %id, "meal removed");
    Ok(Json(json!({ "msg": "meal removed" })))
}
