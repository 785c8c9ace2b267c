use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, food::FoodItem, recipes::client::RecipeDetail, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub s: String,
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/random", get(random))
        .route("/recipes/search", get(search))
        .route("/recipes/category/:category", get(by_category))
        .route("/recipes/id/:id", get(lookup))
}

#[instrument(skip(state))]
pub async fn random(State(state): State<AppState>) -> Result<Json<RecipeDetail>, ApiError> {
    Ok(Json(state.recipes.random().await?))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FoodItem>>, ApiError> {
    Ok(Json(state.recipes.search(&params.s).await?))
}

#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<FoodItem>>, ApiError> {
    Ok(Json(state.recipes.by_category(&category).await?))
}

#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, ApiError> {
    Ok(Json(state.recipes.lookup(&id).await?))
}
